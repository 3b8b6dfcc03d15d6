// ============================================================================
// Session Layer
// Line-oriented text protocol around the matching engine
// ============================================================================
//
// Input: line 1 is the order count N, followed by N order lines of six
// whitespace-separated fields: Time ClientID Side Quantity Kind Price.
// Output: one line per trade, in execution-log order, after the input is
// exhausted.
//
// Structural problems with a line (wrong field count, unparseable numeric
// fields) are fatal and abort the run. Validation failures (bad side/kind
// token, non-positive quantity) discard the single order with a warning
// and processing continues.

use crate::domain::RawOrder;
use crate::engine::MatchingEngine;
use crate::numeric::Price;
use rust_decimal::Decimal;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

/// Fatal session failures. Anything recoverable never surfaces here.
#[derive(Debug)]
pub enum SessionError {
    Io(io::Error),
    /// Input ended before the order-count header
    MissingHeader,
    /// Header line was not a non-negative integer
    BadOrderCount(String),
    /// Input ended before all announced orders were read
    UnexpectedEof { expected: usize, got: usize },
    /// Order line did not have exactly six fields
    MalformedLine { line_no: usize, field_count: usize },
    /// Quantity field was not an integer
    BadQuantity { line_no: usize },
    /// Price field was not a decimal number
    BadPrice { line_no: usize },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Io(err) => write!(f, "i/o error: {}", err),
            SessionError::MissingHeader => write!(f, "missing order count header"),
            SessionError::BadOrderCount(line) => {
                write!(f, "order count header is not an integer: {:?}", line)
            },
            SessionError::UnexpectedEof { expected, got } => write!(
                f,
                "input ended after {} of {} announced orders",
                got, expected
            ),
            SessionError::MalformedLine {
                line_no,
                field_count,
            } => write!(
                f,
                "line {}: expected 6 fields, found {}",
                line_no, field_count
            ),
            SessionError::BadQuantity { line_no } => {
                write!(f, "line {}: quantity is not an integer", line_no)
            },
            SessionError::BadPrice { line_no } => {
                write!(f, "line {}: price is not a decimal number", line_no)
            },
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        SessionError::Io(err)
    }
}

/// Decode one order line into a raw (not yet validated) record.
///
/// The price field is present on every line, market orders included; it
/// parses through `Decimal` and rounds half-to-even to 2 places.
fn parse_order_line(line: &str, line_no: usize) -> Result<RawOrder, SessionError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(SessionError::MalformedLine {
            line_no,
            field_count: fields.len(),
        });
    }

    let quantity: i64 = fields[3]
        .parse()
        .map_err(|_| SessionError::BadQuantity { line_no })?;

    let price = Decimal::from_str(fields[5])
        .map_err(|_| SessionError::BadPrice { line_no })?
        .round_dp(2);
    let price = Price::from_decimal(price).map_err(|_| SessionError::BadPrice { line_no })?;

    Ok(RawOrder {
        time: fields[0].to_string(),
        client_id: fields[1].to_string(),
        side: fields[2].to_string(),
        quantity,
        kind: fields[4].to_string(),
        price,
    })
}

/// Drive a full session: read the header and all order lines from `input`,
/// route valid orders through `engine`, then write one line per executed
/// trade to `output`.
pub fn run<R: BufRead, W: Write>(
    engine: &mut MatchingEngine,
    input: R,
    mut output: W,
) -> Result<(), SessionError> {
    let mut lines = input.lines();

    let header = lines.next().ok_or(SessionError::MissingHeader)??;
    let expected: usize = header
        .trim()
        .parse()
        .map_err(|_| SessionError::BadOrderCount(header.clone()))?;

    for i in 0..expected {
        let line = lines.next().ok_or(SessionError::UnexpectedEof {
            expected,
            got: i,
        })??;
        // Order lines are 1-based after the header line
        let line_no = i + 2;

        let raw = parse_order_line(&line, line_no)?;
        match raw.validate() {
            Ok(order) => {
                engine.process(order);
            },
            Err(reason) => {
                tracing::warn!(line = line_no, %reason, "order discarded");
            },
        }
    }

    for trade in engine.execution_log().iter() {
        writeln!(output, "{}", trade)?;
    }
    output.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_session(input: &str) -> (MatchingEngine, String) {
        let mut engine = MatchingEngine::new();
        let mut output = Vec::new();
        run(&mut engine, input.as_bytes(), &mut output).unwrap();
        (engine, String::from_utf8(output).unwrap())
    }

    fn run_session_err(input: &str) -> SessionError {
        let mut engine = MatchingEngine::new();
        let mut output = Vec::new();
        run(&mut engine, input.as_bytes(), &mut output).unwrap_err()
    }

    #[test]
    fn test_crossing_limits_produce_trades() {
        let input = "3\n\
                     1 C1 b 10 l 10.00\n\
                     2 C2 s 5 l 10.00\n\
                     3 C3 s 10 l 9.00\n";
        let (engine, output) = run_session(input);

        assert_eq!(output, "2 C1 C2 10.00 5\n3 C1 C3 10.00 5\n");

        // Final book holds C3's remaining sell of 5 at 9.00
        let asks: Vec<_> = engine.asks().iter().collect();
        assert_eq!(asks.len(), 1);
        assert_eq!(asks[0].0, "9.00".parse().unwrap());
        assert_eq!(asks[0].1.quantity, 5);
        assert!(engine.bids().is_empty());
    }

    #[test]
    fn test_market_order_without_liquidity_is_silent() {
        let (engine, output) = run_session("1\n1 C1 b 5 m 0\n");
        assert_eq!(output, "");
        assert!(engine.bids().is_empty());
        assert!(engine.asks().is_empty());
    }

    #[test]
    fn test_zero_quantity_is_discarded() {
        let (engine, output) = run_session("1\n1 C1 b 0 l 10.00\n");
        assert_eq!(output, "");
        assert!(engine.bids().is_empty());
    }

    #[test]
    fn test_unknown_side_token_run_continues() {
        let input = "3\n\
                     1 C1 x 10 l 10.00\n\
                     2 C2 b 5 l 10.00\n\
                     3 C3 s 5 l 10.00\n";
        let (_, output) = run_session(input);
        assert_eq!(output, "3 C2 C3 10.00 5\n");
    }

    #[test]
    fn test_market_consumes_same_price_in_arrival_order() {
        let input = "3\n\
                     1 C1 b 5 l 10.00\n\
                     2 C2 b 5 l 10.00\n\
                     3 S1 s 7 m 0\n";
        let (engine, output) = run_session(input);

        assert_eq!(output, "3 S1 C1 10.00 5\n3 S1 C2 10.00 2\n");

        // C2's resting order was reduced to 3 at 10.00
        let bids: Vec<_> = engine.bids().iter().collect();
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].1.client_id, "C2");
        assert_eq!(bids[0].1.quantity, 3);
    }

    #[test]
    fn test_wrong_field_count_is_fatal() {
        let err = run_session_err("1\n1 C1 b 10 l\n");
        assert!(matches!(
            err,
            SessionError::MalformedLine {
                line_no: 2,
                field_count: 5
            }
        ));
    }

    #[test]
    fn test_bad_header_is_fatal() {
        assert!(matches!(run_session_err(""), SessionError::MissingHeader));
        assert!(matches!(
            run_session_err("abc\n"),
            SessionError::BadOrderCount(_)
        ));
    }

    #[test]
    fn test_truncated_input_is_fatal() {
        let err = run_session_err("2\n1 C1 b 10 l 10.00\n");
        assert!(matches!(
            err,
            SessionError::UnexpectedEof {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_unparseable_fields_are_fatal() {
        let err = run_session_err("1\n1 C1 b ten l 10.00\n");
        assert!(matches!(err, SessionError::BadQuantity { line_no: 2 }));

        let err = run_session_err("1\n1 C1 b 10 l abc\n");
        assert!(matches!(err, SessionError::BadPrice { line_no: 2 }));
    }

    #[test]
    fn test_price_rounds_half_to_even() {
        let input = "2\n\
                     1 C1 s 5 l 10.005\n\
                     2 C2 b 5 l 10.00\n";
        let (_, output) = run_session(input);
        // 10.005 rounds to 10.00, so the orders cross
        assert_eq!(output, "2 C1 C2 10.00 5\n");
    }

    #[test]
    fn test_market_price_field_is_ignored() {
        let input = "2\n\
                     1 C1 s 5 l 10.00\n\
                     2 C2 b 5 m 999.99\n";
        let (_, output) = run_session(input);
        assert_eq!(output, "2 C2 C1 10.00 5\n");
    }
}
