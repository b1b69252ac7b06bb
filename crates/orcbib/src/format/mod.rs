//! Textual formats read and written by orcbib.

mod bibtex;
mod sheet;

pub use bibtex::BibTex;
pub use sheet::Csv;
pub(crate) use bibtex::field_text;

/// A textual representation of bibliographic data.
///
/// Formats are promises at the type level about what a [`String`] (or similar) represents.
pub trait Format {
    /// Construct a new type using a [`String`] input.
    ///
    /// This function should not panic or fail as creating a [`Format`] is a type promise about
    /// what the [`String`] represents.
    fn new(val: String) -> Self;

    /// The current [`Format`] as a [`str`].
    fn as_str(&self) -> &str;

    /// Consumes the [`Format`] and returns the raw [`String`].
    fn raw(self) -> String;

    /// The display name of the format.
    fn name() -> &'static str;

    /// The file extension associated with this format.
    fn ext() -> &'static str;
}
