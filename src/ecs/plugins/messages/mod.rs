/*!
# Messages

Wire format, outbound event builders, and the inbound dispatch chain.

Inbound messages are offered to each handler in `HANDLER_CHAIN` in turn; the
first one that recognises the payload handles it and the rest never see it.
Handlers log and carry on when a message references something that is not
in the zone. Nothing in here returns an error to the caller.
*/

pub mod builders;
pub mod character_handlers;
pub mod player_handlers;
pub mod proto;
pub mod util_handlers;

use tracing::debug;

pub use character_handlers::CharacterMessageHandler;
pub use player_handlers::PlayerMessageHandler;
pub use proto::*;
pub use util_handlers::UtilMessageHandler;

use crate::ecs::plugins::world::ZoneWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    Handled,
    NotHandled,
}

pub trait MessageHandler: Sync {
    fn handle_message(&self, world: &mut ZoneWorld, message: &Message) -> HandleOutcome;
}

pub static HANDLER_CHAIN: [&dyn MessageHandler; 3] = [
    &CharacterMessageHandler,
    &PlayerMessageHandler,
    &UtilMessageHandler,
];

/// Offer `message` to each handler until one takes it.
pub fn dispatch(world: &mut ZoneWorld, message: &Message) -> HandleOutcome {
    for handler in HANDLER_CHAIN {
        if handler.handle_message(world, message) == HandleOutcome::Handled {
            return HandleOutcome::Handled;
        }
    }
    debug!(kind = message.payload.kind(), "no handler for message");
    HandleOutcome::NotHandled
}
