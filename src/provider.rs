//! Entry point the host wires to its "peek definition" command.

use tracing::debug;

use crate::classifier::reference_at;
use crate::locator::{CorpusEnumerator, Locator, Oracle, QueryContext};
use crate::tokenizer::TokenSource;
use crate::types::{DocumentMode, LocatorResult, Selection};

/// Decide whether the selection points at a directive or controller and, if
/// so, locate its definitions.
///
/// Returns `None` when the provider declines: the selection is outside
/// markup, spans more than one line, or does not sit on a reference.
/// Otherwise returns the lookup outcome, which may itself be `NotFound`.
/// The selection start is used, since the cursor is usually the selection end.
pub async fn provide<D, E, O>(
    document: &D,
    selection: Selection,
    locator: &Locator<E, O>,
) -> Option<LocatorResult>
where
    D: TokenSource + ?Sized,
    E: CorpusEnumerator,
    O: Oracle,
{
    if document.mode_at(selection.start) != DocumentMode::Markup {
        return None;
    }
    if !selection.is_single_line() {
        return None;
    }

    let (kind, name) = reference_at(document, selection.start)?;
    debug!(kind = %kind, name = %name, "reference under cursor");

    let context = QueryContext {
        document: document.path().to_path_buf(),
        position: selection.start,
    };
    return Some(locator.locate(&context, &name, kind).await);
}
