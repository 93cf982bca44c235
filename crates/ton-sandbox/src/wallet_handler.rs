//! Reference authorized wallet.

use num_bigint::{BigInt, Sign};
use tracing::debug;

use ton_cell::Cell;
use ton_contract::TupleItem;
use ton_wallet::{AccountAuthState, verify};

use crate::handler::{ComputeResult, ContractHandler, Effects, ExitCode, GetContext, MessageContext};

/// The stored data cell does not decode as wallet state.
pub const ERR_CORRUPT_STATE: i32 = 101;

/// Accepts any internal message. An external message is accepted only if
/// it passes [`ton_wallet::verify`] against the stored state; the new
/// seqno is stored and the signed message is sent with the signed mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalletHandler;

fn stored_state(data: &Cell) -> Result<AccountAuthState, ExitCode> {
    AccountAuthState::from_cell(data).map_err(|e| {
        debug!("wallet data does not decode: {}", e);
        ExitCode(ERR_CORRUPT_STATE)
    })
}

impl ContractHandler for WalletHandler {
    fn receive_internal(&self, _ctx: &MessageContext<'_>) -> ComputeResult {
        Ok(Effects::none())
    }

    fn receive_external(&self, ctx: &MessageContext<'_>) -> ComputeResult {
        let state = stored_state(ctx.data)?;
        let auth = verify(&state, ctx.body, ctx.now).map_err(|rejection| {
            debug!(address = %ctx.address, %rejection, "wallet refused external");
            ExitCode(rejection.exit_code())
        })?;

        let data = auth
            .new_state
            .to_cell()
            .map_err(|_| ExitCode(ERR_CORRUPT_STATE))?;
        Ok(Effects::none()
            .with_data(data)
            .send_raw(auth.mode, auth.message))
    }

    fn get(
        &self,
        ctx: &GetContext<'_>,
        method: &str,
        _args: &[TupleItem],
    ) -> Result<Vec<TupleItem>, ExitCode> {
        let state = stored_state(ctx.data)?;
        match method {
            "seqno" => Ok(vec![TupleItem::Int(state.seqno.into())]),
            "get_public_key" => Ok(vec![TupleItem::Int(BigInt::from_bytes_be(
                Sign::Plus,
                &state.public_key,
            ))]),
            _ => Err(ExitCode::UNKNOWN_METHOD),
        }
    }
}
