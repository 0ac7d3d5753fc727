//! Text syntax for types and method types as they appear in signatures:
//!
//! ```text
//! <'a> (Integer, ?String, *any, name: String, ?limit: Integer, **any) { ('a) -> any } -> ::Array<'a>
//! ```

use crate::language::{
    errors::SyntaxError,
    names::{ModuleName, TypeName},
    signature::{BlockDecl, MethodTypeDecl, ParamDecl, ParamsDecl},
    span::Span,
    types::TypeExpr,
};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, satisfy},
    combinator::{all_consuming, map, not, opt, recognize, value, verify},
    multi::{many0_count, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

pub fn parse_type(source: &str) -> Result<TypeExpr, SyntaxError> {
    all_consuming(ws(union_type))(source)
        .map(|(_, ty)| ty)
        .map_err(|err| syntax_error(source, err, "type"))
}

pub fn parse_method_type(source: &str) -> Result<MethodTypeDecl, SyntaxError> {
    all_consuming(ws(method_type))(source)
        .map(|(_, mut method_type)| {
            method_type.span = Span::new(0, source.len());
            method_type
        })
        .map_err(|err| syntax_error(source, err, "method type"))
}

pub fn parse_module_name(source: &str) -> Result<ModuleName, SyntaxError> {
    all_consuming(ws(module_name))(source)
        .map(|(_, name)| name)
        .map_err(|err| syntax_error(source, err, "module name"))
}

fn syntax_error(source: &str, err: nom::Err<nom::error::Error<&str>>, what: &str) -> SyntaxError {
    match err {
        nom::Err::Error(inner) | nom::Err::Failure(inner) => {
            let offset = source.len() - inner.input.len();
            SyntaxError::new(
                format!("invalid {what}"),
                Span::new(offset, source.len()),
            )
            .with_help(format!("could not parse `{}`", inner.input.trim()))
        }
        nom::Err::Incomplete(_) => SyntaxError::new(
            format!("unexpected end of {what}"),
            Span::new(source.len(), source.len()),
        ),
    }
}

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(
        tag(word),
        not(satisfy(|c: char| c.is_ascii_alphanumeric() || c == '_')),
    )
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn constant(input: &str) -> IResult<&str, &str> {
    verify(identifier, |ident: &str| {
        ident.starts_with(|c: char| c.is_ascii_uppercase() || c == '_')
    })(input)
}

fn label(input: &str) -> IResult<&str, &str> {
    verify(identifier, |ident: &str| {
        ident.starts_with(|c: char| c.is_ascii_lowercase())
    })(input)
}

fn module_name(input: &str) -> IResult<&str, ModuleName> {
    map(
        pair(opt(tag("::")), separated_list1(tag("::"), constant)),
        |(root, segments)| {
            ModuleName::new(
                segments.into_iter().map(str::to_string).collect(),
                root.is_some(),
            )
        },
    )(input)
}

fn type_var(input: &str) -> IResult<&str, String> {
    map(preceded(char('\''), identifier), str::to_string)(input)
}

#[derive(Clone, Copy)]
enum NameSuffix {
    Module,
    Class { constructor: bool },
}

fn name_suffix(input: &str) -> IResult<&str, NameSuffix> {
    preceded(
        char('.'),
        alt((
            value(NameSuffix::Module, keyword("module")),
            map(
                pair(keyword("class"), opt(preceded(multispace0, keyword("constructor")))),
                |(_, constructor)| NameSuffix::Class {
                    constructor: constructor.is_some(),
                },
            ),
        )),
    )(input)
}

fn type_args(input: &str) -> IResult<&str, Vec<TypeExpr>> {
    delimited(
        ws(char('<')),
        separated_list1(ws(char(',')), union_type),
        ws(char('>')),
    )(input)
}

fn named_type(input: &str) -> IResult<&str, TypeExpr> {
    map(
        tuple((module_name, opt(type_args), opt(name_suffix))),
        |(name, args, suffix)| {
            let type_name = match suffix {
                Some(NameSuffix::Module) => TypeName::Module(name),
                Some(NameSuffix::Class { constructor }) => TypeName::Class { name, constructor },
                None if name.simple_name().starts_with('_') => TypeName::Interface(name),
                None => TypeName::Instance(name),
            };
            TypeExpr::Name {
                name: type_name,
                args: args.unwrap_or_default(),
            }
        },
    )(input)
}

fn primary_type(input: &str) -> IResult<&str, TypeExpr> {
    ws(alt((
        delimited(ws(char('(')), union_type, ws(char(')'))),
        value(TypeExpr::Any, keyword("any")),
        value(TypeExpr::SelfType, keyword("self")),
        value(TypeExpr::Instance, keyword("instance")),
        value(TypeExpr::Class, keyword("class")),
        map(type_var, TypeExpr::Var),
        named_type,
    )))(input)
}

fn intersection_type(input: &str) -> IResult<&str, TypeExpr> {
    map(separated_list1(char('&'), primary_type), |mut types| {
        if types.len() == 1 {
            types.remove(0)
        } else {
            TypeExpr::Intersection(types)
        }
    })(input)
}

fn union_type(input: &str) -> IResult<&str, TypeExpr> {
    map(separated_list1(char('|'), intersection_type), |mut types| {
        if types.len() == 1 {
            types.remove(0)
        } else {
            TypeExpr::Union(types)
        }
    })(input)
}

fn keyword_label(input: &str) -> IResult<&str, String> {
    map(
        terminated(ws(label), pair(char(':'), not(char(':')))),
        str::to_string,
    )(input)
}

fn param(input: &str) -> IResult<&str, ParamDecl> {
    ws(alt((
        map(preceded(tag("**"), union_type), ParamDecl::RestKeyword),
        map(preceded(char('*'), union_type), ParamDecl::Rest),
        map(
            preceded(char('?'), pair(keyword_label, union_type)),
            |(name, ty)| ParamDecl::OptionalKeyword(name, ty),
        ),
        map(preceded(char('?'), union_type), ParamDecl::Optional),
        map(pair(keyword_label, union_type), |(name, ty)| {
            ParamDecl::RequiredKeyword(name, ty)
        }),
        map(union_type, ParamDecl::Required),
    )))(input)
}

fn params(input: &str) -> IResult<&str, Option<Box<ParamsDecl>>> {
    map(
        delimited(
            ws(char('(')),
            separated_list0(ws(char(',')), param),
            ws(char(')')),
        ),
        ParamsDecl::chain,
    )(input)
}

fn block(input: &str) -> IResult<&str, BlockDecl> {
    map(
        delimited(
            ws(char('{')),
            pair(opt(params), preceded(ws(tag("->")), union_type)),
            ws(char('}')),
        ),
        |(params, return_type)| BlockDecl {
            params: params.flatten(),
            return_type,
        },
    )(input)
}

fn method_type(input: &str) -> IResult<&str, MethodTypeDecl> {
    map(
        tuple((
            opt(delimited(
                ws(char('<')),
                separated_list1(ws(char(',')), ws(type_var)),
                ws(char('>')),
            )),
            opt(params),
            opt(block),
            preceded(ws(tag("->")), union_type),
        )),
        |(type_params, params, block, return_type)| MethodTypeDecl {
            type_params: type_params.unwrap_or_default(),
            params: params.flatten(),
            block,
            return_type,
            span: Span::default(),
        },
    )(input)
}
