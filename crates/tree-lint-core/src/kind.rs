//! Token and node kinds.
//!
//! The set is closed: every node of a [`SyntaxTree`](crate::SyntaxTree)
//! carries exactly one of these kinds, and checks declare their interest in
//! terms of them. Each kind has a canonical upper-case name that is used in
//! configuration files and tree documents.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! token_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// Kind of a syntax tree node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TokenKind {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl TokenKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$variant,)*];

            /// Returns the canonical configuration name of this kind.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(TokenKind::$variant => $name,)*
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(TokenKind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

token_kinds! {
    CompilationUnit => "COMPILATION_UNIT",
    PackageDef => "PACKAGE_DEF",
    Import => "IMPORT",
    StaticImport => "STATIC_IMPORT",
    Annotations => "ANNOTATIONS",
    Annotation => "ANNOTATION",
    Modifiers => "MODIFIERS",
    ClassDef => "CLASS_DEF",
    InterfaceDef => "INTERFACE_DEF",
    EnumDef => "ENUM_DEF",
    RecordDef => "RECORD_DEF",
    AnnotationDef => "ANNOTATION_DEF",
    ObjBlock => "OBJBLOCK",
    CtorDef => "CTOR_DEF",
    MethodDef => "METHOD_DEF",
    VariableDef => "VARIABLE_DEF",
    Parameters => "PARAMETERS",
    ParameterDef => "PARAMETER_DEF",
    Type => "TYPE",
    TypeArguments => "TYPE_ARGUMENTS",
    TypeParameters => "TYPE_PARAMETERS",
    ExtendsClause => "EXTENDS_CLAUSE",
    ImplementsClause => "IMPLEMENTS_CLAUSE",
    Slist => "SLIST",
    StaticInit => "STATIC_INIT",
    InstanceInit => "INSTANCE_INIT",
    Expr => "EXPR",
    Elist => "ELIST",
    MethodCall => "METHOD_CALL",
    Lambda => "LAMBDA",
    LiteralIf => "LITERAL_IF",
    LiteralElse => "LITERAL_ELSE",
    LiteralFor => "LITERAL_FOR",
    LiteralWhile => "LITERAL_WHILE",
    LiteralDo => "LITERAL_DO",
    DoWhile => "DO_WHILE",
    LiteralSwitch => "LITERAL_SWITCH",
    CaseGroup => "CASE_GROUP",
    LiteralCase => "LITERAL_CASE",
    LiteralDefault => "LITERAL_DEFAULT",
    LiteralTry => "LITERAL_TRY",
    LiteralCatch => "LITERAL_CATCH",
    LiteralFinally => "LITERAL_FINALLY",
    LiteralReturn => "LITERAL_RETURN",
    LiteralThrow => "LITERAL_THROW",
    LiteralBreak => "LITERAL_BREAK",
    LiteralContinue => "LITERAL_CONTINUE",
    LiteralNew => "LITERAL_NEW",
    LiteralClass => "LITERAL_CLASS",
    LiteralInterface => "LITERAL_INTERFACE",
    LiteralPublic => "LITERAL_PUBLIC",
    LiteralProtected => "LITERAL_PROTECTED",
    LiteralPrivate => "LITERAL_PRIVATE",
    LiteralStatic => "LITERAL_STATIC",
    Final => "FINAL",
    Abstract => "ABSTRACT",
    LiteralVoid => "LITERAL_VOID",
    LiteralInt => "LITERAL_INT",
    LiteralBoolean => "LITERAL_BOOLEAN",
    LiteralTrue => "LITERAL_TRUE",
    LiteralFalse => "LITERAL_FALSE",
    LiteralNull => "LITERAL_NULL",
    LiteralThis => "LITERAL_THIS",
    Assign => "ASSIGN",
    Plus => "PLUS",
    Minus => "MINUS",
    Star => "STAR",
    Div => "DIV",
    Mod => "MOD",
    Equal => "EQUAL",
    NotEqual => "NOT_EQUAL",
    Lt => "LT",
    Gt => "GT",
    Le => "LE",
    Ge => "GE",
    Land => "LAND",
    Lor => "LOR",
    Lnot => "LNOT",
    Question => "QUESTION",
    Colon => "COLON",
    Dot => "DOT",
    Semi => "SEMI",
    Comma => "COMMA",
    Lparen => "LPAREN",
    Rparen => "RPAREN",
    Lcurly => "LCURLY",
    Rcurly => "RCURLY",
    Ident => "IDENT",
    NumInt => "NUM_INT",
    NumLong => "NUM_LONG",
    NumFloat => "NUM_FLOAT",
    NumDouble => "NUM_DOUBLE",
    StringLiteral => "STRING_LITERAL",
    CharLiteral => "CHAR_LITERAL",
    SingleLineComment => "SINGLE_LINE_COMMENT",
    BlockCommentBegin => "BLOCK_COMMENT_BEGIN",
    CommentContent => "COMMENT_CONTENT",
    BlockCommentEnd => "BLOCK_COMMENT_END",
}

impl TokenKind {
    /// Number of distinct kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index in `0..COUNT`, suitable for table lookups.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns true for the synthetic comment kinds.
    #[must_use]
    pub const fn is_comment(self) -> bool {
        matches!(
            self,
            Self::SingleLineComment
                | Self::BlockCommentBegin
                | Self::CommentContent
                | Self::BlockCommentEnd
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A kind name that is not part of [`TokenKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown token kind `{0}`")]
pub struct UnknownTokenKind(pub String);

impl FromStr for TokenKind {
    type Err = UnknownTokenKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::from_name(trimmed)
            .or_else(|| Self::from_name(&trimmed.to_ascii_uppercase()))
            .ok_or_else(|| UnknownTokenKind(trimmed.to_string()))
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TokenKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_dense() {
        for (i, kind) in TokenKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(TokenKind::COUNT, TokenKind::ALL.len());
    }

    #[test]
    fn parses_canonical_and_lowercase_names() {
        assert_eq!("METHOD_DEF".parse::<TokenKind>(), Ok(TokenKind::MethodDef));
        assert_eq!(" slist ".parse::<TokenKind>(), Ok(TokenKind::Slist));
        assert_eq!(
            "NOPE".parse::<TokenKind>(),
            Err(UnknownTokenKind("NOPE".to_string()))
        );
    }

    #[test]
    fn names_round_trip_through_display() {
        for kind in TokenKind::ALL {
            assert_eq!(kind.to_string().parse::<TokenKind>(), Ok(*kind));
        }
    }

    #[test]
    fn comment_kinds() {
        assert!(TokenKind::CommentContent.is_comment());
        assert!(TokenKind::BlockCommentEnd.is_comment());
        assert!(!TokenKind::Ident.is_comment());
    }
}
