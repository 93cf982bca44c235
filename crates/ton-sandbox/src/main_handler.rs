//! Reference forwarding contract.

use ton_cell::CellSlice;
use ton_contract::{InternalMessage, SendMode};
use ton_main::{ERR_UNKNOWN_OP, ERR_WRONG_SENDER, MainConfig, OP_SEND_MESSAGE};

use crate::handler::{ComputeResult, ContractHandler, Effects, ExitCode, MessageContext};

/// Empty bodies and bounces are accepted. `op = 1` from the stored address
/// sends the incoming value back to it with mode 64; from anyone else it
/// fails with 500. Other ops fail with 0xffff.
#[derive(Debug, Clone, Copy, Default)]
pub struct MainHandler;

impl ContractHandler for MainHandler {
    fn receive_internal(&self, ctx: &MessageContext<'_>) -> ComputeResult {
        if ctx.bounced || ctx.body.is_empty() {
            return Ok(Effects::none());
        }

        let op = CellSlice::new(ctx.body).load_u32()?;
        if op != OP_SEND_MESSAGE {
            return Err(ExitCode(ERR_UNKNOWN_OP));
        }

        let config = MainConfig::from_cell(ctx.data).map_err(|_| ExitCode::CELL_UNDERFLOW)?;
        if ctx.src != Some(&config.addr) {
            return Err(ExitCode(ERR_WRONG_SENDER));
        }

        let reply = InternalMessage::new(config.addr, 0).with_bounce(false);
        Effects::none().send(SendMode::CARRY_ALL_REMAINING_INCOMING_VALUE, &reply)
    }
}
