use crate::lexer::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

impl PrefixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Bang => Some(Self::Bang),
            TokenKind::Minus => Some(Self::Minus),
            _ => None,
        }
    }

    pub fn get_binding_power(&self) -> u8 {
        match self {
            // 2. Unary operators
            Self::Bang | Self::Minus => 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Multiply,
    Divide,
    Add,
    Subtract,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    EqualEqual,
    BangEqual,
}

impl InfixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Self::Add),
            TokenKind::Minus => Some(Self::Subtract),
            TokenKind::Star => Some(Self::Multiply),
            TokenKind::Slash => Some(Self::Divide),
            TokenKind::LessThan => Some(Self::LessThan),
            TokenKind::LessThanEqual => Some(Self::LessThanEqual),
            TokenKind::GreaterThan => Some(Self::GreaterThan),
            TokenKind::GreaterThanEqual => Some(Self::GreaterThanEqual),
            TokenKind::EqualEqual => Some(Self::EqualEqual),
            TokenKind::BangEqual => Some(Self::BangEqual),
            _ => None,
        }
    }

    pub fn get_binding_power(&self) -> (u8, u8) {
        match self {
            // 3. Multiplicative operators
            Self::Multiply | Self::Divide => (13, 14),
            // 4. Additive operators
            Self::Add | Self::Subtract => (11, 12),
            // 5. Comparison operators
            Self::LessThan | Self::LessThanEqual | Self::GreaterThan | Self::GreaterThanEqual => {
                (9, 10)
            }
            // 6. Equality operators
            Self::EqualEqual | Self::BangEqual => (7, 8),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
            Self::EqualEqual => "==",
            Self::BangEqual => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixShortCircuitOperator {
    And,
    Or,
}

impl InfixShortCircuitOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::KeywordAnd => Some(Self::And),
            TokenKind::KeywordOr => Some(Self::Or),
            _ => None,
        }
    }

    pub fn get_binding_power(&self) -> (u8, u8) {
        match self {
            // 7. Logical AND operator
            Self::And => (5, 6),
            // 8. Logical OR operator
            Self::Or => (3, 4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixAssignmentOperator {
    Assign,
}

impl InfixAssignmentOperator {
    pub fn get_binding_power(&self) -> (u8, u8) {
        match self {
            // 9. Assignment operator
            Self::Assign => (2, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOperator {
    Call,
}

impl PostfixOperator {
    pub fn get_binding_power(&self) -> u8 {
        match self {
            // 1. Call operator
            Self::Call => 17,
        }
    }
}
