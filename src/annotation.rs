//! The text annotation structure returned by the Vision API.
//!
//! Document text detection returns a `fullTextAnnotation` organized as pages
//! → blocks → paragraphs → words → symbols. We only keep the fields we use;
//! bounding boxes, confidences and detected languages are ignored during
//! deserialization.

use crate::prelude::*;

/// The root of a document text detection result.
///
/// All of the structural fields below are required. If the OCR service hands
/// us an annotation with any of them missing, deserialization fails, and the
/// caller reports a malformed annotation instead of guessing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnnotation {
    /// The pages of the scanned document. A label photo normally has one.
    pub pages: Vec<AnnotationPage>,

    /// The full transcript of the document, as assembled by the OCR service.
    /// We log this for debugging but extract ingredients from the
    /// paragraph structure instead.
    #[serde(default)]
    pub text: Option<String>,
}

/// A single page of recognized text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationPage {
    /// The blocks of text on this page.
    pub blocks: Vec<AnnotationBlock>,
}

/// A block of text, usually a visually distinct region of the label.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationBlock {
    /// The paragraphs in this block.
    pub paragraphs: Vec<AnnotationParagraph>,
}

/// A paragraph of recognized words.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationParagraph {
    /// The words in this paragraph, in reading order.
    pub words: Vec<AnnotationWord>,
}

/// A single recognized word.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationWord {
    /// The symbols making up this word, in reading order.
    pub symbols: Vec<AnnotationSymbol>,
}

/// A single recognized character.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSymbol {
    /// The recognized text of this symbol.
    pub text: String,
}

/// Flatten an annotation into one string per paragraph, in document order.
///
/// Words are their symbols concatenated with no separator, and a paragraph
/// is its words joined with single spaces. We do no filtering here; that's
/// the extractor's job.
pub fn paragraph_texts(annotation: &TextAnnotation) -> Vec<String> {
    let mut paragraphs = vec![];
    for page in &annotation.pages {
        for block in &page.blocks {
            for paragraph in &block.paragraphs {
                let words = paragraph
                    .words
                    .iter()
                    .map(|word| {
                        word.symbols
                            .iter()
                            .map(|symbol| symbol.text.as_str())
                            .collect::<String>()
                    })
                    .collect::<Vec<_>>();
                let text = words.join(" ");
                debug!("Paragraph: {text}");
                paragraphs.push(text);
            }
        }
    }
    paragraphs
}
