// Peregrine Assembler and SHIMMER Genome Assembly Toolkit
// 2019, 2020, 2021- (c) by Jason, Chen-Shan, Chin
//
// This Source Code Form is subject to the terms of the
// Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International License.
//
// You should have received a copy of the license along with this
// work. If not, see <http://creativecommons.org/licenses/by-nc-sa/4.0/>.

use thiserror::Error;

/// Errors raised while loading the overlap data or building the unitig layout
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The best-overlap graph handed us something that can not be laid out,
    /// e.g. a best edge that is not a dovetail or a placement that fails.
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },

    #[error("malformed record in {file} at line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("input/output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl LayoutError {
    pub fn invariant<S: Into<String>>(message: S) -> Self {
        LayoutError::InvariantViolation {
            message: message.into(),
        }
    }
}

pub type LayoutResult<T> = Result<T, LayoutError>;
