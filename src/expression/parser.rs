//! Expression parser built with nom
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! sum     := product (("+" | "-") product)*
//! product := unary (("*" | "/") unary)*
//! unary   := "-" unary | "+" unary | power
//! power   := primary (("**" | "^") unary)?
//! primary := number | "(" sum ")" | "d(" identifier ")" | call | identifier
//! ```

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{map, map_res, opt, recognize, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

use super::{BinaryOp, ExprResult, Expression, ExpressionError, UnaryOp, UNCERTAINTY_PREFIX};

/// Parse a complete expression, rejecting trailing input
pub(crate) fn parse_expression(input: &str) -> ExprResult<Expression> {
    match sum(input) {
        Ok((remainder, expr)) => {
            // Make sure the entire input was consumed
            if remainder.trim().is_empty() {
                Ok(expr)
            } else {
                Err(ExpressionError::ParseError {
                    message: format!("Unexpected trailing characters: '{}'", remainder),
                })
            }
        }
        Err(e) => Err(ExpressionError::ParseError {
            message: format!("{:?}", e),
        }),
    }
}

/// Surround a parser with optional whitespace
fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse an identifier (variable or function name)
fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        |name: &str| name.to_string(),
    )
    .parse(input)
}

/// Parse an unsigned number literal; signs are handled as unary operators
fn number(input: &str) -> IResult<&str, Expression> {
    map_res(
        recognize((
            alt((
                recognize((digit1, opt((char('.'), digit0)))),
                recognize((char('.'), digit1)),
            )),
            opt((one_of("eE"), opt(one_of("+-")), digit1)),
        )),
        |text: &str| text.parse::<f64>().map(Expression::Number),
    )
    .parse(input)
}

/// Parse an uncertainty symbol `d(name)`
fn uncertainty_symbol(input: &str) -> IResult<&str, Expression> {
    map(
        preceded(
            tag(UNCERTAINTY_PREFIX),
            delimited(ws(char('(')), identifier, ws(char(')'))),
        ),
        Expression::Uncertainty,
    )
    .parse(input)
}

/// Parse a function call
fn function_call(input: &str) -> IResult<&str, Expression> {
    let (input, name) = identifier(input)?;
    let (input, args) = delimited(
        ws(char('(')),
        separated_list1(ws(char(',')), sum),
        ws(char(')')),
    )
    .parse(input)?;

    Ok((input, Expression::Function(name, args)))
}

/// Parse a variable reference
fn variable(input: &str) -> IResult<&str, Expression> {
    map(identifier, Expression::Variable).parse(input)
}

/// Parse a parenthesized expression
fn parens(input: &str) -> IResult<&str, Expression> {
    delimited(ws(char('(')), sum, ws(char(')'))).parse(input)
}

fn primary(input: &str) -> IResult<&str, Expression> {
    alt((number, parens, uncertainty_symbol, function_call, variable)).parse(input)
}

/// Parse a power expression; the exponent may carry its own sign (`2^-x`)
fn power(input: &str) -> IResult<&str, Expression> {
    let (input, base) = ws(primary).parse(input)?;
    let (input, exponent) =
        opt(preceded(ws(alt((tag("**"), tag("^")))), unary)).parse(input)?;

    let expr = match exponent {
        Some(exponent) => Expression::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)),
        None => base,
    };
    Ok((input, expr))
}

fn unary(input: &str) -> IResult<&str, Expression> {
    alt((
        map(preceded(ws(char('-')), unary), |expr| {
            Expression::Unary(UnaryOp::Neg, Box::new(expr))
        }),
        preceded(ws(char('+')), unary),
        power,
    ))
    .parse(input)
}

fn multiplicative_op(input: &str) -> IResult<&str, BinaryOp> {
    ws(alt((
        value(BinaryOp::Mul, char('*')),
        value(BinaryOp::Div, char('/')),
    )))
    .parse(input)
}

fn additive_op(input: &str) -> IResult<&str, BinaryOp> {
    ws(alt((
        value(BinaryOp::Add, char('+')),
        value(BinaryOp::Sub, char('-')),
    )))
    .parse(input)
}

/// Fold a chain of same-precedence operations left to right
fn fold_left(first: Expression, rest: Vec<(BinaryOp, Expression)>) -> Expression {
    rest.into_iter().fold(first, |lhs, (op, rhs)| {
        Expression::Binary(op, Box::new(lhs), Box::new(rhs))
    })
}

fn product(input: &str) -> IResult<&str, Expression> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(pair(multiplicative_op, unary)).parse(input)?;
    Ok((input, fold_left(first, rest)))
}

fn sum(input: &str) -> IResult<&str, Expression> {
    let (input, first) = product(input)?;
    let (input, rest) = many0(pair(additive_op, product)).parse(input)?;
    Ok((input, fold_left(first, rest)))
}
