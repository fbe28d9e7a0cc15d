use crate::{parse, ParseResult, Rule};
use pest::iterators::Pair;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSummary {
    pub name: String,
    /// Normalized declaration, e.g. `float prediction(float *features, int n_features)`.
    pub signature: String,
    pub returns: usize,
    /// Leading columns before the most deeply indented `return`.
    pub max_return_indent: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub includes: Vec<String>,
    pub functions: Vec<FunctionSummary>,
}

impl SourceSummary {
    pub fn function(&self, name: &str) -> Option<&FunctionSummary> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.functions.iter().filter(|f| f.name == name).count()
    }

    pub fn includes_header(&self, header: &str) -> bool {
        self.includes.iter().any(|h| h == header)
    }
}

pub fn summarize(input: &str) -> ParseResult<SourceSummary> {
    let mut summary = SourceSummary::default();

    for pair in parse(input)? {
        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::include => {
                    if let Some(header) = item.into_inner().next() {
                        summary.includes.push(header.as_str().to_string());
                    }
                }
                Rule::function => summary.functions.push(summarize_function(item)),
                _ => {}
            }
        }
    }

    Ok(summary)
}

fn summarize_function(pair: Pair<'_, Rule>) -> FunctionSummary {
    let mut return_type = String::new();
    let mut name = String::new();
    let mut params = Vec::new();
    let mut returns = 0;
    let mut max_return_indent = 0;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::type_name => return_type = part.as_str().to_string(),
            Rule::identifier => name = part.as_str().to_string(),
            Rule::param_list => params = format_params(part),
            Rule::block => {
                for inner in part.into_inner().flatten() {
                    if inner.as_rule() == Rule::return_stmt {
                        returns += 1;
                        let (_, col) = inner.as_span().start_pos().line_col();
                        max_return_indent = max_return_indent.max(col - 1);
                    }
                }
            }
            _ => {}
        }
    }

    FunctionSummary {
        signature: format!("{} {}({})", return_type, name, params.join(", ")),
        name,
        returns,
        max_return_indent,
    }
}

fn format_params(pair: Pair<'_, Rule>) -> Vec<String> {
    pair.into_inner()
        .map(|param| match param.as_rule() {
            Rule::param => {
                let mut ty = "";
                let mut pointer = false;
                let mut ident = "";
                for piece in param.into_inner() {
                    match piece.as_rule() {
                        Rule::type_name => ty = piece.as_str(),
                        Rule::pointer => pointer = true,
                        Rule::identifier => ident = piece.as_str(),
                        _ => {}
                    }
                }
                if pointer {
                    format!("{} *{}", ty, ident)
                } else {
                    format!("{} {}", ty, ident)
                }
            }
            _ => param.as_str().to_string(),
        })
        .collect()
}
