use crate::{
    interface::Params,
    language::{
        ast::{Node, NodeKind},
        types::TypeExpr,
    },
};
use indexmap::IndexMap;

/// Splits off the trailing hash literal that carries keyword arguments. Only
/// signatures with keyword parameters take one.
fn split_keyword_argument<'n>(params: &Params, args: &'n [Node]) -> (&'n [Node], Option<&'n Node>) {
    match args.split_last() {
        Some((last, positional)) if params.has_keywords() && last.is_hash() => {
            (positional, Some(last))
        }
        _ => (args, None),
    }
}

/// Symbol-keyed entries of a hash literal, in source order. Other keys are
/// skipped.
fn keyword_entries(hash: &Node) -> IndexMap<&str, &Node> {
    let mut keywords = IndexMap::new();
    if let NodeKind::Hash(elements) = &hash.kind {
        for element in elements {
            if let NodeKind::Pair { key, value } = &element.kind {
                if let NodeKind::Sym(name) = &key.kind {
                    keywords.insert(name.as_str(), value.as_ref());
                }
            }
        }
    }
    keywords
}

fn passed_keywords<'n>(params: &Params, args: &'n [Node]) -> IndexMap<&'n str, &'n Node> {
    split_keyword_argument(params, args)
        .1
        .map(keyword_entries)
        .unwrap_or_default()
}

impl Params {
    /// Indexes of required positional parameters with no argument.
    pub fn missing_arguments(&self, args: &[Node]) -> Vec<usize> {
        let (positional, _) = split_keyword_argument(self, args);
        (positional.len()..self.required.len()).collect()
    }

    /// Indexes of positional arguments beyond what the signature accepts.
    pub fn extra_arguments(&self, args: &[Node]) -> Vec<usize> {
        if self.rest.is_some() {
            return Vec::new();
        }
        let (positional, _) = split_keyword_argument(self, args);
        let accepted = self.required.len() + self.optional.len();
        (accepted..positional.len()).collect()
    }

    pub fn missing_keywords(&self, args: &[Node]) -> Vec<String> {
        let keywords = passed_keywords(self, args);
        self.required_keywords
            .keys()
            .filter(|name| !keywords.contains_key(name.as_str()))
            .cloned()
            .collect()
    }

    /// Keywords passed but not declared; empty when a rest-keyword parameter
    /// absorbs them.
    pub fn extra_keywords(&self, args: &[Node]) -> Vec<String> {
        if self.rest_keywords.is_some() {
            return Vec::new();
        }
        passed_keywords(self, args)
            .keys()
            .filter(|name| !self.declares_keyword(name))
            .map(|name| name.to_string())
            .collect()
    }
}

/// Pairs each expected parameter type with the argument expression that
/// fills it. Parameters without an argument and arguments without a
/// parameter are left out.
pub fn argument_typing_pairs<'p, 'n>(
    params: &'p Params,
    args: &'n [Node],
) -> Vec<(&'p TypeExpr, &'n Node)> {
    let (positional, keyword_hash) = split_keyword_argument(params, args);
    let mut keywords = keyword_hash.map(keyword_entries).unwrap_or_default();
    let mut pairs = Vec::new();

    let mut remaining = positional.iter();
    for param_type in params.flat_unnamed_params() {
        match remaining.next() {
            Some(arg) => pairs.push((param_type, arg)),
            None => break,
        }
    }

    if let Some(rest) = &params.rest {
        pairs.extend(remaining.map(|arg| (rest, arg)));
    }

    for (name, ty) in params.flat_keywords() {
        if let Some(arg) = keywords.shift_remove(name.as_str()) {
            pairs.push((ty, arg));
        }
    }

    if let Some(rest_keywords) = &params.rest_keywords {
        pairs.extend(keywords.into_values().map(|arg| (rest_keywords, arg)));
    }

    pairs
}
