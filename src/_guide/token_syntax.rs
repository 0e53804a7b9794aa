/*!

# Token Expressions

An input is described by one or more token expressions separated by `"; "`.
Each iteration draws one value per token, in order, and joins the values
with single spaces. The result is written to every candidate's standard
input, followed by a newline.

## Integer ranges

`[a, b]` draws an integer between `a` and `b`. A square bracket includes its
bound and a parenthesis excludes it, so `(0, 10]` draws from `1..=10` and
`(0, 3)` draws `1` or `2`. A range whose resolved bounds cross is a
[`Grammar`][crate::ErrorKind::Grammar] error.

## Float ranges

If either bound has a decimal point, `[0.5, 2]` draws a float from
`0.5` up to (but excluding) `2`. Brackets do not change float bounds.

## Sets

`{red, green, blue}` draws one of its members uniformly. Members are
separated by `", "` and kept as text; duplicates are collapsed.

## Sequences

`[<element>, len=[a, b]]` draws a length from the integer range and then
that many elements, where the element is an integer range, a float range or
a set:

```
# fn foo() -> diffstress::Result<()> {
use diffstress::{parse_token, Session};

let mut session = Session::new();
let token = parse_token("[[1, 3], len=[2, 2]]")?;
let mut generator = token.generator();

let value: String = session.generate_with(&mut generator)?;
let values: Vec<i64> = value.split(' ').map(|v| v.parse().unwrap()).collect();
assert_eq!(values.len(), 2);
assert!(values.iter().all(|v| (1..=3).contains(v)));
# Ok(())
# }
# foo().unwrap();
```

A sequence generator produces exactly one value; the input stream asks the
token for a fresh generator every iteration, so a new length and new
elements are drawn each time.

## Putting it together

```
# fn foo() -> diffstress::Result<()> {
use diffstress::{Inputs, Session};

let inputs = Inputs::from_tokens(
    "[1, 5]; [{L, R}, len=[1, 4]]",
    Some(10),
    Session::new().seed(7),
)?;
for input in inputs {
    println!("{}", input?);
}
# Ok(())
# }
# foo().unwrap();
```

 */
