pub mod health;
pub mod sessions;

use std::sync::Arc;

use crate::clients::responder::Responder;
use crate::session::protocol::RandomSource;

pub type SharedResponder = Arc<dyn Responder>;
pub type SharedRandom = Arc<dyn RandomSource>;
