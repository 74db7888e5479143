//! `convert_kana(text, text) -> text`: marshal, invoke, translate.

use tracing::debug;

use super::domain::CallResult;
use super::invoke::invoke;
use super::marshal::marshal_pair;
use super::translate::translate;
use crate::foreign::ForeignRoutine;
use crate::host::{Host, TextArgument};

/// Run one conversion of `text` under `mode` through `routine`, allocating
/// everything the caller keeps in `host`.
pub fn convert_kana<'h, H: Host>(
    host: &'h H,
    routine: &dyn ForeignRoutine,
    text: TextArgument<'_>,
    mode: TextArgument<'_>,
) -> CallResult<'h, H::Text<'h>> {
    debug!(text_len = text.len(), mode_len = mode.len(), "convert_kana");
    let (text, mode) = marshal_pair(host, text, mode)?;
    let result = invoke(routine, &text, &mode)?;
    translate(host, result)
}
