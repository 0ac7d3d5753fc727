mod checker;
mod support;
