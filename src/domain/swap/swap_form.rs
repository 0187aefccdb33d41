//! Swap form: token selection, amounts, direction flip

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::types::Token;

/// Which side of the form a token selection applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    From,
    To,
}

/// What the submit button does right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapAction {
    ConnectWallet,
    SelectToken,
    EnterAmount,
    Swapping,
    Swap,
}

impl SwapAction {
    pub fn label(&self) -> &'static str {
        match self {
            SwapAction::ConnectWallet => "Connect Wallet",
            SwapAction::SelectToken => "Select a token",
            SwapAction::EnterAmount => "Enter an amount",
            SwapAction::Swapping => "Swapping...",
            SwapAction::Swap => "Swap",
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, SwapAction::ConnectWallet | SwapAction::Swap)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapForm {
    from_token: Token,
    to_token: Option<Token>,
    from_amount: String,
    to_amount: String,
    slippage_pct: Decimal,
}

impl SwapForm {
    pub fn new(from_token: Token, slippage_pct: Decimal) -> Self {
        Self {
            from_token,
            to_token: None,
            from_amount: String::new(),
            to_amount: String::new(),
            slippage_pct,
        }
    }

    pub fn from_token(&self) -> &Token {
        &self.from_token
    }

    pub fn to_token(&self) -> Option<&Token> {
        self.to_token.as_ref()
    }

    pub fn from_amount(&self) -> &str {
        &self.from_amount
    }

    pub fn to_amount(&self) -> &str {
        &self.to_amount
    }

    pub fn slippage_pct(&self) -> Decimal {
        self.slippage_pct
    }

    pub fn set_from_amount(&mut self, amount: impl Into<String>) {
        self.from_amount = amount.into();
    }

    pub(crate) fn set_to_amount(&mut self, amount: impl Into<String>) {
        self.to_amount = amount.into();
    }

    pub fn set_slippage_pct(&mut self, slippage_pct: Decimal) {
        self.slippage_pct = slippage_pct;
    }

    /// MAX button: copy the displayed balance into the input
    pub fn use_max(&mut self, balance: &str) {
        self.from_amount = balance.to_string();
    }

    /// Select a token for one side. Picking the token already on the other
    /// side swaps the two. Returns false when the selection was refused.
    pub fn select_token(&mut self, side: Side, token: Token) -> bool {
        match side {
            Side::From => {
                if self.to_token.as_ref().is_some_and(|t| t.symbol == token.symbol) {
                    self.to_token = Some(self.from_token.clone());
                }
                self.from_token = token;
            }
            Side::To => {
                if self.from_token.symbol == token.symbol {
                    match self.to_token.take() {
                        Some(previous) => self.from_token = previous,
                        None => return false,
                    }
                }
                self.to_token = Some(token);
            }
        }
        true
    }

    /// Swap direction: tokens and amounts are exchanged together.
    /// No-op until an output token is selected.
    pub fn flip(&mut self) -> bool {
        let Some(to_token) = self.to_token.take() else {
            return false;
        };
        let from_token = std::mem::replace(&mut self.from_token, to_token);
        self.to_token = Some(from_token);
        std::mem::swap(&mut self.from_amount, &mut self.to_amount);
        true
    }

    pub fn clear_amounts(&mut self) {
        self.from_amount.clear();
        self.to_amount.clear();
    }

    pub fn action(&self, connected: bool, submitting: bool) -> SwapAction {
        if !connected {
            SwapAction::ConnectWallet
        } else if self.to_token.is_none() {
            SwapAction::SelectToken
        } else if self.from_amount.trim().is_empty() {
            SwapAction::EnterAmount
        } else if submitting {
            SwapAction::Swapping
        } else {
            SwapAction::Swap
        }
    }
}
