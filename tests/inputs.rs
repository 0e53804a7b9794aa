use diffstress::{InputSource, Inputs, Session, Suite, Supplied};
use std::io::Write;

fn collect(inputs: Inputs) -> anyhow::Result<Vec<String>> {
    Ok(inputs.collect::<diffstress::Result<Vec<_>>>()?)
}

#[test]
fn token_mode_draws_one_value_per_token_in_order() -> anyhow::Result<()> {
    let inputs = Inputs::from_tokens("[1, 9]; {x}; [[5, 5], len=[3, 3]]", Some(20), Session::new())?;
    let inputs = collect(inputs)?;
    assert_eq!(inputs.len(), 20);

    for input in &inputs {
        let fields: Vec<&str> = input.split(' ').collect();
        assert_eq!(fields.len(), 5, "{input}");
        let n: i64 = fields[0].parse()?;
        assert!((1..=9).contains(&n));
        assert_eq!(fields[1], "x");
        assert_eq!(&fields[2..], ["5", "5", "5"]);
    }
    Ok(())
}

#[test]
fn sequences_are_redrawn_every_iteration() -> anyhow::Result<()> {
    let inputs = Inputs::from_tokens("[[1, 1], len=[1, 6]]", Some(200), Session::new().seed(11))?;
    let lengths: std::collections::HashSet<usize> = collect(inputs)?
        .iter()
        .map(|input| input.split(' ').count())
        .collect();
    assert_eq!(lengths.len(), 6);
    Ok(())
}

#[test]
fn unbounded_token_mode_keeps_going() -> anyhow::Result<()> {
    let inputs = Inputs::from_tokens("{a, b}", None, Session::new())?;
    assert_eq!(inputs.take(5000).count(), 5000);
    Ok(())
}

#[test]
fn seeded_streams_replay() -> anyhow::Result<()> {
    let expr = "[1, 1000000]; [[-9, 9], len=[0, 20]]; {p, q, r}";
    let first = Inputs::from_tokens(expr, Some(50), Session::new().seed(99))?;
    assert_eq!(first.seed(), Some(99));
    let second = Inputs::from_tokens(expr, Some(50), Session::new().seed(99))?;
    assert_eq!(collect(first)?, collect(second)?);
    Ok(())
}

#[test]
fn a_bad_token_fails_before_any_input() {
    let err = Inputs::from_tokens("[1, 2]; nope", Some(3), Session::new())
        .err()
        .expect("grammar error");
    assert!(err.is_grammar());
}

#[test]
fn file_mode_yields_each_line_regardless_of_iterations() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, "1 2 3\nhello world\r\n\n")?;

    let suite = {
        let mut suite = Suite::new();
        suite.iterations(Some(100));
        suite
    };
    let source = InputSource::from_option(&file.path().display().to_string());
    assert!(matches!(source, InputSource::File(_)));

    let inputs = suite.inputs(source)?;
    assert_eq!(inputs.seed(), None);
    assert_eq!(collect(inputs)?, ["1 2 3", "hello world", ""]);
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Inputs::from_file("/definitely/not/here.txt".as_ref())
        .err()
        .expect("io error");
    assert!(matches!(err.kind(), diffstress::ErrorKind::Io { .. }));
}

#[test]
fn option_text_selects_the_mode() {
    for text in ["[1, 2]", "(1, 2]", "{a}"] {
        assert!(matches!(InputSource::from_option(text), InputSource::Tokens(_)), "{text}");
    }
    for text in ["inputs.txt", "./x", ""] {
        assert!(matches!(InputSource::from_option(text), InputSource::File(_)), "{text}");
    }
}

#[test]
fn supplied_lists_and_iterators_are_used_as_is() -> anyhow::Result<()> {
    let list = Inputs::from_supplied(Supplied::list(["b", "a"]));
    assert_eq!(collect(list)?, ["b", "a"]);

    let lazy = Inputs::from_supplied(Supplied::lazy((1..=3).map(|n| n.to_string())));
    assert_eq!(collect(lazy)?, ["1", "2", "3"]);

    let boxed: Box<dyn Iterator<Item = String>> = Box::new(std::iter::repeat("x".to_string()).take(2));
    let dynamic = Supplied::from_any(Box::new(boxed))?;
    assert_eq!(collect(Inputs::from_supplied(dynamic))?, ["x", "x"]);

    let static_strs = Supplied::from_any(Box::new(vec!["p", "q"]))?;
    assert_eq!(collect(Inputs::from_supplied(static_strs))?, ["p", "q"]);
    Ok(())
}

#[test]
fn supplied_values_of_other_types_are_rejected() {
    let err = Supplied::from_any(Box::new(3.5_f64)).unwrap_err();
    assert!(err.is_config_type());

    let err = Supplied::from_any(Box::new(vec![1, 2, 3])).unwrap_err();
    assert!(err.is_config_type());
}
