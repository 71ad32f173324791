use rowan::TextRange;

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// When two diagnostics have overlapping spans, the higher-priority one
/// suppresses the lower-priority one. This prevents cascading error noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // These cause cascading errors throughout the rest of the file
    UnclosedParen,
    UnclosedBracket,
    UnclosedBrace,
    UnclosedBracketHandler,
    UnterminatedString,
    UnterminatedComment,

    // User omitted something required - root cause errors
    ExpectedToken,
    ExpectedExpression,
    ExpectedType,
    ExpectedName,
    ExpectedCaptureName,
    ExpectedFieldName,

    // User wrote something that doesn't belong
    UnrecognizedCharacters,
    InvalidAssignmentTarget,
    ImportAfterDeclaration,
    InvalidClassMember,
    ModifierNotAllowed,
    VariadicNotAllowed,
    EmptyNodePattern,
    BareIdentifier,
    ErrorTakesNoArguments,
    CaptureWithoutTarget,
    UnexpectedToken,

    // Input exceeded a configured limit
    NestingTooDeep,
}

impl DiagnosticKind {
    /// Whether this kind suppresses `other` when spans overlap.
    ///
    /// Uses enum discriminant ordering: lower position = higher priority.
    pub fn suppresses(&self, other: &DiagnosticKind) -> bool {
        self < other
    }

    /// Structural errors are Unclosed* - they cause cascading errors but
    /// should be suppressed by root-cause errors at the same position.
    pub fn is_structural_error(&self) -> bool {
        matches!(
            self,
            Self::UnclosedParen
                | Self::UnclosedBracket
                | Self::UnclosedBrace
                | Self::UnclosedBracketHandler
        )
    }

    /// Root cause errors - user omitted something required.
    /// These suppress structural errors at the same position.
    pub fn is_root_cause_error(&self) -> bool {
        matches!(
            self,
            Self::ExpectedToken
                | Self::ExpectedExpression
                | Self::ExpectedType
                | Self::ExpectedName
                | Self::ExpectedCaptureName
                | Self::ExpectedFieldName
        )
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnclosedParen => "missing closing `)`",
            Self::UnclosedBracket => "missing closing `]`",
            Self::UnclosedBrace => "missing closing `}`",
            Self::UnclosedBracketHandler => "missing closing `>`",
            Self::UnterminatedString => "unterminated string literal",
            Self::UnterminatedComment => "unterminated block comment",

            Self::ExpectedToken => "expected token",
            Self::ExpectedExpression => "expected an expression",
            Self::ExpectedType => "expected a type",
            Self::ExpectedName => "expected a name",
            Self::ExpectedCaptureName => "expected capture name",
            Self::ExpectedFieldName => "expected field name",

            Self::UnrecognizedCharacters => "unrecognized characters",
            Self::InvalidAssignmentTarget => "invalid assignment target",
            Self::ImportAfterDeclaration => "imports must come before other declarations",
            Self::InvalidClassMember => "invalid statement in class body",
            Self::ModifierNotAllowed => "modifier is only allowed on declaration-only functions",
            Self::VariadicNotAllowed => "variadic parameters are only allowed in declarations",
            Self::EmptyNodePattern => "empty `()` is not allowed",
            Self::BareIdentifier => "bare identifier is not valid",
            Self::ErrorTakesNoArguments => "`(ERROR)` cannot have children",
            Self::CaptureWithoutTarget => "capture has no target",
            Self::UnexpectedToken => "unexpected token",

            Self::NestingTooDeep => "nesting is too deep",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::ExpectedToken => "expected {}".to_string(),
            Self::BareIdentifier => "bare identifier `{}` is not valid".to_string(),
            Self::InvalidClassMember => "{}".to_string(),
            Self::UnclosedParen
            | Self::UnclosedBracket
            | Self::UnclosedBrace
            | Self::UnclosedBracketHandler => {
                format!("{}; {{}}", self.fallback_message())
            }
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One reported problem, anchored to a byte range of the source it was produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub(crate) kind: DiagnosticKind,
    /// The range shown to the user (underlined in output).
    pub(crate) range: TextRange,
    /// The range used for suppression logic. Defaults to `range`; the parser widens it to
    /// the innermost open delimiter so cascades inside it can be dropped.
    pub(crate) suppression_range: TextRange,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
}

impl Diagnostic {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            suppression_range: range,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, range: TextRange) -> Self {
        Self::new(kind, range, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn related(&self) -> &[RelatedInfo] {
        &self.related
    }

    /// Moves every range by `delta` bytes.
    pub(crate) fn shifted(&self, delta: i64) -> Diagnostic {
        let shift = |range: TextRange| {
            let start = (i64::from(u32::from(range.start())) + delta) as u32;
            let end = (i64::from(u32::from(range.end())) + delta) as u32;
            TextRange::new(start.into(), end.into())
        };
        Diagnostic {
            kind: self.kind,
            range: shift(self.range),
            suppression_range: shift(self.suppression_range),
            message: self.message.clone(),
            related: self
                .related
                .iter()
                .map(|r| RelatedInfo::new(shift(r.range), r.message.clone()))
                .collect(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error at {}..{}: {}",
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        Ok(())
    }
}
