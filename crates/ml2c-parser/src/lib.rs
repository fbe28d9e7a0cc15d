/*! Parse generated C back into structure.
 *
 * A C compiler is not always around when source is generated, so this crate checks the emitted
 * subset on its own: the grammar accepts exactly the constructs ml2c writes, and the summary pass
 * reports the functions, includes and `return` statements a reviewer or test needs to see.
 */

use pest::Parser;
use pest_derive::Parser;

pub mod summary;

pub use summary::{summarize, FunctionSummary, SourceSummary};

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct CSubsetParser;

pub type ParseResult<T> = Result<T, Box<pest::error::Error<Rule>>>;

pub fn parse(input: &str) -> ParseResult<pest::iterators::Pairs<'_, Rule>> {
    CSubsetParser::parse(Rule::translation_unit, input).map_err(Box::new)
}

pub fn check(input: &str) -> bool {
    parse(input).is_ok()
}
