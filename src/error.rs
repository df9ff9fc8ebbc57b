use crate::types::{PieceType, Point};

/// Errors raised by the rules engine.
///
/// Off-board coordinates and clicks on squares that are not legal targets are
/// part of normal play and never show up here.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("refusing to capture own piece at {at}")]
    FriendlyFireCapture { at: Point },

    #[error("no piece at {at}")]
    NoPieceAt { at: Point },

    #[error("no rook to castle with at {at}")]
    MissingCastlingRook { at: Point },

    #[error("cannot promote to {}", .0.to_human())]
    InvalidPromotion(PieceType),

    #[error("invalid placement string: {0}")]
    InvalidPlacement(String),
}

pub type Result<T> = std::result::Result<T, RulesError>;
