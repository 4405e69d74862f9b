//! Field-rule violations reported by document validation.

/// A single failed field rule.
///
/// Validation stops at the first failing rule, so a document reports exactly
/// one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Msg: invalid type '{0}'")]
    InvalidType(String),

    #[error("Msg: image should not have 'content'")]
    ImageHasContent,

    #[error("Msg: image should not have 'charaId'")]
    ImageHasCharaId,

    #[error("Msg: url is too long ({0} characters)")]
    UrlTooLong(usize),

    #[error("Msg: url is invalid")]
    UrlInvalid,

    #[error("Msg: non-image should not have 'url'")]
    NonImageHasUrl,

    #[error("Msg: content is empty")]
    ContentEmpty,

    #[error("Msg: content is too long ({0} characters)")]
    ContentTooLong(usize),

    #[error("Msg: charaId is empty")]
    CharaIdEmpty,

    #[error("Msg: non-chara msg should not have 'charaId'")]
    NonCharaHasCharaId,

    #[error("Chara: name is empty")]
    NameEmpty,

    #[error("Chara: name is too long ({0} characters)")]
    NameTooLong(usize),

    #[error("Chara: color is invalid")]
    ColorInvalid,
}
