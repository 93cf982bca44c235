//! Reference jetton minter.

use std::sync::Arc;

use ton_cell::{Cell, CellSlice, MsgAddress};
use ton_contract::{InternalMessage, SendMode, TupleItem};
use ton_jetton::{
    InternalTransfer, JettonData, JettonError, MinterData, MinterRequest, jetton_wallet_address,
    jetton_wallet_state_init,
};

use crate::handler::{ComputeResult, ContractHandler, Effects, ExitCode, GetContext, MessageContext};

/// Sender of an admin op is not the stored admin.
pub const ERR_NOT_ADMIN: i32 = 73;

impl From<JettonError> for ExitCode {
    fn from(err: JettonError) -> Self {
        match err {
            JettonError::UnknownOp(_) => ExitCode::UNKNOWN_OP,
            _ => ExitCode::CELL_UNDERFLOW,
        }
    }
}

/// Admin-only minter: `mint` (21) grows the supply and deploys or tops up
/// the holder's wallet, `call_to` (6) relays a message to it and
/// `upgrade` (5) swaps code and data. Outbound messages use mode 1, so the
/// action phase fails with 37 when the minter cannot cover `amount`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinterHandler;

impl MinterHandler {
    /// Message to `owner`'s jetton wallet, deploying it when `with_init`.
    fn wallet_message(
        data: &MinterData,
        minter: &MsgAddress,
        owner: &MsgAddress,
        amount: u128,
        body: Arc<Cell>,
        with_init: bool,
    ) -> Result<InternalMessage, ExitCode> {
        let init = jetton_wallet_state_init(owner, minter, data.jetton_wallet_code.clone())?;
        let wallet = init.address(workchain(minter))?;
        let msg = InternalMessage::new(wallet, amount).with_body(body);
        Ok(if with_init { msg.with_init(init) } else { msg })
    }
}

fn workchain(address: &MsgAddress) -> i32 {
    address.workchain().unwrap_or(0)
}

impl ContractHandler for MinterHandler {
    fn receive_internal(&self, ctx: &MessageContext<'_>) -> ComputeResult {
        if ctx.bounced || ctx.body.is_empty() {
            return Ok(Effects::none());
        }

        let request = MinterRequest::parse(ctx.body)?;
        let mut data = MinterData::from_cell(ctx.data)?;
        if ctx.src != Some(&data.admin_address) {
            return Err(ExitCode(ERR_NOT_ADMIN));
        }

        match request {
            MinterRequest::Mint {
                to_address,
                amount,
                master_msg,
                ..
            } => {
                let jetton_amount = InternalTransfer::from_cell(&master_msg)?.amount;
                data.total_supply = data
                    .total_supply
                    .checked_add(jetton_amount)
                    .ok_or(ExitCode::INTEGER_OVERFLOW)?;
                let msg = Self::wallet_message(
                    &data,
                    ctx.address,
                    &to_address,
                    amount,
                    master_msg,
                    true,
                )?;
                Effects::none()
                    .with_data(data.to_cell()?)
                    .send(SendMode::PAY_GAS_SEPARATELY, &msg)
            }
            MinterRequest::CallTo {
                to_address,
                amount,
                master_msg,
                ..
            } => {
                let msg = Self::wallet_message(
                    &data,
                    ctx.address,
                    &to_address,
                    amount,
                    master_msg,
                    false,
                )?;
                Effects::none().send(SendMode::PAY_GAS_SEPARATELY, &msg)
            }
            MinterRequest::Upgrade {
                new_data, new_code, ..
            } => Ok(Effects {
                data: Some(new_data),
                code: Some(new_code),
                actions: Vec::new(),
            }),
        }
    }

    fn get(
        &self,
        ctx: &GetContext<'_>,
        method: &str,
        args: &[TupleItem],
    ) -> Result<Vec<TupleItem>, ExitCode> {
        let data = MinterData::from_cell(ctx.data)?;
        match method {
            "get_jetton_data" => Ok(JettonData {
                total_supply: data.total_supply.into(),
                mintable: true,
                admin_address: data.admin_address,
                content: Arc::new(Cell::empty()),
                wallet_code: data.jetton_wallet_code,
            }
            .to_stack()?),
            "get_wallet_address" => {
                let owner = match args.first() {
                    Some(TupleItem::Slice(cell)) | Some(TupleItem::Cell(cell)) => {
                        CellSlice::new(cell).load_address()?
                    }
                    _ => return Err(ExitCode::CELL_UNDERFLOW),
                };
                let wallet = jetton_wallet_address(
                    &owner,
                    ctx.address,
                    data.jetton_wallet_code,
                    workchain(ctx.address),
                )?;
                Ok(vec![TupleItem::address(&wallet)?])
            }
            _ => Err(ExitCode::UNKNOWN_METHOD),
        }
    }
}
