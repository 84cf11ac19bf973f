use axum::extract::FromRef;

use crate::{
    core::CoreArc,
    maker::MakerArc
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub core: CoreArc,
    pub maker: MakerArc
}
