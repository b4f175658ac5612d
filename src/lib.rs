//! # Pegtree
//!
//! Pegtree is a small PEG engine: it compiles grammars written in a compact
//! textual notation into executable matcher graphs and matches input text
//! against them, producing trees of labeled [nodes](runtime::Node).
//!
//! The engine is self-describing: the reader for the notation is assembled
//! from the same matcher primitives it produces, and user grammars go
//! through the regular [compiler](compiler) pipeline (parse, generate,
//! resolve references).
//!
//! ## Usage
//!
//! ```rust
//! use pegtree::grammar::Grammar;
//!
//! // 1. Define the grammar; the first rule is the entry point
//! let grammar = Grammar::new(
//!     r#"
//! greeting <- hello " " world "!"*
//! hello    <- "Hello"
//! world    <- "world"
//! "#,
//! )
//! .unwrap_or_else(|err| panic!("{}", err));
//!
//! // 2. Match a subject against it
//! let node = grammar
//!     .parse("Hello world!!")
//!     .unwrap_or_else(|err| panic!("{}", err));
//!
//! // 3. Walk the node tree
//! assert_eq!(node.name(), Some("greeting"));
//! assert_eq!(node.text(), "Hello world!!");
//! ```
//!
//! To turn parse trees into values, bind semantic actions to rules with a
//! [`Language`](language::Language).

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]

pub mod compiler;
pub mod grammar;
pub mod language;
pub mod runtime;
