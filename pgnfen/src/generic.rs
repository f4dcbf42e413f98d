//! Colors lifted to the type level, so move generation can be monomorphized per side

use crate::types;

pub trait Color {
    const COLOR: types::Color;
    type Inv: Color;
}

pub struct White;
pub struct Black;

impl Color for White {
    const COLOR: types::Color = types::Color::White;
    type Inv = Black;
}

impl Color for Black {
    const COLOR: types::Color = types::Color::Black;
    type Inv = White;
}
