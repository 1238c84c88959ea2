//! Transfer form: field state, validation, token binding lifecycle and the
//! submit state machine.

use alloy_primitives::U256;
use tracing::{debug, info, warn};

use crate::{
    address::validate_address,
    contract::{bind, BindOptions, Erc20Contract},
    error::{WalletError, WalletResult},
    model::{
        Field, FieldErrors, TokenBinding, TxHash, INVALID_ADDRESS, INVALID_AMOUNT, READ_FAILURE,
        TOKEN_NOT_LOADED,
    },
    provider::WalletProvider,
    session::WalletSession,
    units::{is_positive_amount, to_base_units},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferState {
    #[default]
    Idle,
    Submitting,
}

/// Ticket for an in-flight token bind. Only the ticket matching the current
/// contract field may update the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    pub contract_address: String,
    generation: u64,
}

/// A validated transfer, ready to be signed and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransfer {
    pub contract_address: String,
    pub from: String,
    pub recipient: String,
    /// Amount in token base units.
    pub amount: U256,
}

impl PreparedTransfer {
    pub async fn send<P: WalletProvider>(&self, provider: &P) -> WalletResult<TxHash> {
        Erc20Contract::new(provider, &self.contract_address)?
            .transfer(&self.from, &self.recipient, self.amount)
            .await
    }
}

#[derive(Debug, Default)]
pub struct TransferForm {
    contract_address: String,
    recipient: String,
    amount: String,
    errors: FieldErrors,
    binding: Option<TokenBinding>,
    generation: u64,
    state: TransferState,
    options: BindOptions,
    action_error: Option<WalletError>,
    last_tx: Option<TxHash>,
}

impl TransferForm {
    pub fn new(options: BindOptions) -> Self {
        TransferForm {
            options,
            ..Default::default()
        }
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The binding for the current contract address, if one was read.
    pub fn binding(&self) -> Option<&TokenBinding> {
        self.binding.as_ref()
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == TransferState::Submitting
    }

    /// Error of the last transfer attempt, cleared by the next one.
    pub fn action_error(&self) -> Option<&WalletError> {
        self.action_error.as_ref()
    }

    pub fn last_tx(&self) -> Option<&TxHash> {
        self.last_tx.as_ref()
    }

    /// Raw edit of the contract field. Any change drops the current binding
    /// and orphans binds still in flight.
    pub fn set_contract_address(&mut self, value: &str) {
        if value != self.contract_address {
            self.generation += 1;
            if self.binding.take().is_some() {
                debug!("Contract address changed, dropping token binding");
            }
            self.contract_address = value.to_string();
        }
    }

    pub fn set_recipient(&mut self, value: &str) {
        self.recipient = value.to_string();
    }

    pub fn set_amount(&mut self, value: &str) {
        self.amount = value.to_string();
    }

    /// Re-runs the check for one field and updates its error message.
    pub fn validate_field(&mut self, field: Field) -> bool {
        let valid = match field {
            Field::ContractAddress => validate_address(&self.contract_address),
            Field::Recipient => validate_address(&self.recipient),
            Field::TransferAmount => is_positive_amount(&self.amount),
        };
        if valid {
            self.errors.clear(field);
        } else {
            let message = match field {
                Field::TransferAmount => INVALID_AMOUNT,
                _ => INVALID_ADDRESS,
            };
            self.errors.set(field, message);
        }
        valid
    }

    pub fn validate_all(&mut self) -> bool {
        Field::ALL
            .into_iter()
            .fold(true, |valid, field| self.validate_field(field) && valid)
    }

    pub fn submittable(&self) -> bool {
        !self.contract_address.is_empty()
            && !self.recipient.is_empty()
            && !self.amount.is_empty()
            && validate_address(&self.contract_address)
            && validate_address(&self.recipient)
            && is_positive_amount(&self.amount)
    }

    /// Validates the contract field and, if it holds an address, hands out the
    /// ticket for binding it.
    pub fn begin_bind(&mut self) -> Option<BindRequest> {
        if !self.validate_field(Field::ContractAddress) {
            self.binding = None;
            return None;
        }
        Some(BindRequest {
            contract_address: self.contract_address.clone(),
            generation: self.generation,
        })
    }

    /// Applies a bind result. Returns false, leaving the form untouched, when
    /// the contract field changed since `request` was issued.
    pub fn complete_bind(
        &mut self,
        request: BindRequest,
        result: WalletResult<TokenBinding>,
    ) -> bool {
        if request.generation != self.generation {
            debug!(
                "Dropping stale token binding for {}",
                request.contract_address
            );
            return false;
        }
        match result {
            Ok(binding) => {
                self.errors.clear(Field::ContractAddress);
                self.binding = Some(binding);
            }
            Err(e) => {
                warn!("Could not bind token {}: {}", request.contract_address, e);
                self.errors
                    .set(Field::ContractAddress, format!("{READ_FAILURE}: {e}"));
                self.binding = None;
            }
        }
        true
    }

    /// Field blur on the contract input: validate, then bind.
    pub async fn blur_contract_address<P: WalletProvider>(
        &mut self,
        session: &WalletSession<P>,
    ) -> bool {
        let Some(request) = self.begin_bind() else {
            return false;
        };
        let result = bind(session, &request.contract_address, &self.options).await;
        self.complete_bind(request, result) && self.binding.is_some()
    }

    fn bound_decimals(&self) -> Option<u8> {
        self.binding
            .as_ref()
            .filter(|b| b.is_for(&self.contract_address))
            .map(|b| b.decimals)
    }

    /// Whether the amount can be scaled: the token is bound, or its decimals
    /// are not queried at all.
    pub fn token_ready(&self) -> bool {
        self.bound_decimals().is_some() || !self.options.query_decimals
    }

    fn decimals_for_transfer(&mut self) -> WalletResult<u8> {
        if let Some(decimals) = self.bound_decimals() {
            return Ok(decimals);
        }
        if !self.options.query_decimals {
            return Ok(self.options.default_decimals);
        }
        if !self.errors.has_error(Field::ContractAddress) {
            self.errors.set(Field::ContractAddress, TOKEN_NOT_LOADED);
        }
        Err(WalletError::validation(
            Field::ContractAddress,
            self.errors.get(Field::ContractAddress),
        ))
    }

    /// Idle -> Submitting. Checks the form, the session and the token
    /// binding, converts the amount to base units. On error the state stays
    /// `Idle`.
    ///
    /// With decimals queried from the token, an unbound contract is refused
    /// rather than scaled with a guessed default.
    pub fn begin_submit<P>(&mut self, session: &WalletSession<P>) -> WalletResult<PreparedTransfer> {
        if self.is_busy() {
            return Err(WalletError::Busy);
        }
        self.action_error = None;
        if !self.submittable() {
            self.validate_all();
            let (field, reason) = self
                .errors
                .iter()
                .next()
                .map(|(field, reason)| (field, reason.to_string()))
                .unwrap_or((Field::TransferAmount, INVALID_AMOUNT.to_string()));
            return Err(WalletError::Validation { field, reason });
        }
        let from = session.account().ok_or(WalletError::NotConnected)?;
        let decimals = self.decimals_for_transfer()?;
        let amount = to_base_units(&self.amount, decimals).map_err(|e| {
            self.errors.set(Field::TransferAmount, e.to_string());
            WalletError::validation(Field::TransferAmount, e.to_string())
        })?;

        self.state = TransferState::Submitting;
        info!(
            "📤 Submitting transfer of {} to {} on {}",
            self.amount, self.recipient, self.contract_address
        );
        Ok(PreparedTransfer {
            contract_address: self.contract_address.clone(),
            from: from.to_string(),
            recipient: self.recipient.clone(),
            amount,
        })
    }

    /// Submitting -> Idle, whatever the outcome.
    pub fn finish_submit(&mut self, result: WalletResult<TxHash>) -> WalletResult<TxHash> {
        self.state = TransferState::Idle;
        match &result {
            Ok(hash) => {
                info!("✅ Transfer sent: {}", hash);
                self.last_tx = Some(hash.clone());
            }
            Err(e) => {
                warn!("Transfer failed: {}", e);
                self.action_error = Some(e.clone());
            }
        }
        result
    }

    pub async fn submit<P: WalletProvider>(
        &mut self,
        session: &WalletSession<P>,
    ) -> WalletResult<TxHash> {
        let prepared = self.begin_submit(session)?;
        let result = match session.provider() {
            Some(provider) => prepared.send(provider).await,
            None => Err(WalletError::NotConnected),
        };
        self.finish_submit(result)
    }

    pub fn headline<P>(&self, session: &WalletSession<P>) -> &'static str {
        if session.is_connected() {
            "Send tokens"
        } else {
            "Connect your wallet"
        }
    }

    pub fn inputs_enabled<P>(&self, session: &WalletSession<P>) -> bool {
        session.is_connected()
    }

    /// Whether the transfer button can be pressed right now.
    pub fn transfer_enabled(&self) -> bool {
        self.submittable() && self.token_ready() && !self.is_busy()
    }

    pub fn token_line(&self) -> Option<String> {
        self.binding.as_ref().map(|b| format!("Token: {}", b.name))
    }

    pub fn balance_line(&self) -> Option<String> {
        self.binding
            .as_ref()
            .map(|b| format!("Balance: {} {}", b.display_balance(), b.symbol))
    }
}
