use diffstress::{generators as g, parse_token, Element, Generate, IntRange, Session, Shape, Token};
use std::collections::HashSet;

fn draw(token: &str, session: &mut Session) -> anyhow::Result<String> {
    let mut generator = parse_token(token)?.generator();
    Ok(session.generate_with(&mut generator)?)
}

#[test]
fn int_range_stays_within_bounds_and_reaches_them() -> anyhow::Result<()> {
    let mut session = Session::new().seed(1);
    let mut generator = parse_token("[-5, 5]")?.generator();

    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let value: i64 = session.generate_with(&mut generator)?.parse()?;
        assert!((-5..=5).contains(&value), "{value} out of range");
        seen.insert(value);
    }
    assert_eq!(seen.len(), 11);
    Ok(())
}

#[test]
fn exclusive_brackets_shrink_int_ranges() -> anyhow::Result<()> {
    let cases = [
        ("[0, 10]", 0, 10),
        ("(0, 10]", 1, 10),
        ("[0, 10)", 0, 9),
        ("(0, 10)", 1, 9),
        ("(-3, -1)", -2, -2),
    ];
    for (text, lo, hi) in cases {
        match parse_token(text)? {
            Token::IntRange(range) => {
                assert_eq!((range.lo(), range.hi()), (lo, hi), "{text}");
            }
            other => panic!("{text} parsed as {other:?}"),
        }
    }

    let mut session = Session::new().seed(2);
    for _ in 0..1000 {
        let value: i64 = draw("(0, 3)", &mut session)?.parse()?;
        assert!(value == 1 || value == 2);
    }
    Ok(())
}

#[test]
fn empty_int_ranges_are_rejected() {
    for text in ["(0, 1)", "[5, 1]", "(1, 1]"] {
        let err = parse_token(text).unwrap_err();
        assert!(err.is_grammar(), "{text}: {err}");
    }
}

#[test]
fn float_range_needs_a_decimal_point() -> anyhow::Result<()> {
    assert!(matches!(parse_token("[0.5, 2]")?, Token::FloatRange(_)));
    assert!(matches!(parse_token("[0, 2.]")?, Token::FloatRange(_)));
    assert!(matches!(parse_token("[0, 2]")?, Token::IntRange(_)));

    let mut session = Session::new().seed(3);
    for _ in 0..10_000 {
        let value: f64 = draw("(0.5, 2.5)", &mut session)?.parse()?;
        assert!((0.5..2.5).contains(&value), "{value} out of range");
    }
    Ok(())
}

#[test]
fn set_samples_only_members_and_covers_all_of_them() -> anyhow::Result<()> {
    let mut session = Session::new().seed(4);
    let mut generator = parse_token("{a, b, c}")?.generator();

    let mut seen = HashSet::new();
    for _ in 0..1000 {
        let value = session.generate_with(&mut generator)?;
        assert!(["a", "b", "c"].contains(&value.as_str()), "{value}");
        seen.insert(value);
    }
    assert_eq!(seen.len(), 3);
    Ok(())
}

#[test]
fn set_members_are_deduplicated_in_order() -> anyhow::Result<()> {
    match parse_token("{x, y, x, z}")? {
        Token::Set(set) => assert_eq!(set.values(), ["x", "y", "z"]),
        other => panic!("parsed as {other:?}"),
    }
    Ok(())
}

#[test]
fn malformed_sets_are_rejected() {
    for text in ["{}", "{a, , b}"] {
        assert!(parse_token(text).unwrap_err().is_grammar(), "{text}");
    }
}

#[test]
fn fixed_length_sequence() -> anyhow::Result<()> {
    let mut session = Session::new().seed(5);
    for _ in 0..1000 {
        let value = draw("[[1,3], len=[2,2]]", &mut session)?;
        let values = value
            .split(' ')
            .map(str::parse::<i64>)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(values.len(), 2, "{value}");
        assert!(values.iter().all(|v| (1..=3).contains(v)), "{value}");
    }
    Ok(())
}

#[test]
fn sequence_of_set_members() -> anyhow::Result<()> {
    let token = parse_token("[{L, R}, len=[0, 4]]")?;
    match &token {
        Token::Sequence(seq) => {
            assert!(matches!(seq.element(), Element::Set(_)));
            assert_eq!((seq.length().lo(), seq.length().hi()), (0, 4));
        }
        other => panic!("parsed as {other:?}"),
    }

    let mut session = Session::new().seed(6);
    let mut lengths = HashSet::new();
    for _ in 0..500 {
        let value = session.generate_with(&mut token.generator())?;
        let members: Vec<&str> = value.split(' ').filter(|m| !m.is_empty()).collect();
        assert!(members.iter().all(|m| *m == "L" || *m == "R"), "{value}");
        lengths.insert(members.len());
    }
    assert_eq!(lengths.len(), 5);
    Ok(())
}

#[test]
fn sequence_generators_are_one_shot() -> anyhow::Result<()> {
    let token = parse_token("[[1, 9], len=[1, 3]]")?;
    assert_eq!(token.shape(), Shape::OneShot);

    let mut generator = token.generator();
    let mut session = Session::new().seed(7);
    session.generate_with(&mut generator)?;
    let again: diffstress::Result<String> = session.generate_with(&mut generator);
    assert!(again.unwrap_err().is_exhausted());
    Ok(())
}

#[test]
fn huge_sequence_lengths_do_not_preallocate() -> anyhow::Result<()> {
    struct Unavailable;

    impl Generate<String> for Unavailable {
        fn generate(&mut self, _: &mut diffstress::Context) -> diffstress::Result<String> {
            Err(diffstress::Error::other("no elements"))
        }
    }

    let huge = 1_000_000_000_000_000_000;
    let mut generator = g::repeat(g::ints(IntRange::new(huge, huge)?), Unavailable);
    let err = Session::new().generate_with(&mut generator).unwrap_err();
    assert!(err.to_string().contains("no elements"), "{err}");
    Ok(())
}

#[test]
fn invalid_sequences_are_rejected() {
    for text in [
        "[[1, 3], len=[-1, 2]]",
        "[[1, 3], len=[1.5, 2]]",
        "[[[1, 2], len=[1, 1]], len=[1, 1]]",
        "[hello, len=[1, 2]]",
    ] {
        assert!(parse_token(text).unwrap_err().is_grammar(), "{text}");
    }
}

#[test]
fn unrecognized_tokens_are_grammar_errors() {
    for text in ["not-a-token", "", "[1 2]", "[a, b]", "<1, 2>", "1, 2"] {
        assert!(parse_token(text).unwrap_err().is_grammar(), "{text:?}");
    }
}

#[test]
fn tokens_display_in_canonical_form() -> anyhow::Result<()> {
    assert_eq!(parse_token("(0, 10)")?.to_string(), "[1, 9]");
    assert_eq!(parse_token("{a, b}")?.to_string(), "{a, b}");
    assert_eq!(
        parse_token("[[1, 3], len=[2, 2]]")?.to_string(),
        "[[1, 3], len=[2, 2]]"
    );
    Ok(())
}

#[test]
fn same_seed_same_values() -> anyhow::Result<()> {
    let token: Token = "[[0, 1000000], len=[1, 10]]".parse()?;
    let mut first = Session::new().seed(0xdead_beef);
    let mut second = Session::new().seed(0xdead_beef);
    for _ in 0..50 {
        let a = first.generate_with(&mut token.generator())?;
        let b = second.generate_with(&mut token.generator())?;
        assert_eq!(a, b);
    }
    Ok(())
}

#[test]
fn custom_generators_compose_with_repeat() -> anyhow::Result<()> {
    struct Letter;

    impl Generate<String> for Letter {
        fn generate(&mut self, context: &mut diffstress::Context) -> diffstress::Result<String> {
            let letters = ['a', 'b', 'c'];
            Ok(context.rng().choose(&letters).copied().unwrap_or('a').to_string())
        }
    }

    let mut generator = g::repeat(g::ints(IntRange::new(3, 3)?), Letter);
    let value = Session::new().generate_with(&mut generator)?;
    assert_eq!(value.split(' ').count(), 3);
    Ok(())
}
