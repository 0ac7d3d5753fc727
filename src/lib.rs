#![allow(clippy::collapsible_if)]

pub mod diagnostics;
pub mod interface;
pub mod language;
pub mod typecheck;

#[cfg(test)]
mod tests;
