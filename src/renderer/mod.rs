//! Canvas 2D presentation (wasm only)
//!
//! Owns the 2D context and the sprite atlas; every frame it repaints
//! the whole scene from the simulation state. Nothing here feeds back
//! into the simulation.

pub mod scene;
pub mod sprites;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::Settings;
use crate::sim::GameState;
use sprites::SpriteAtlas;

pub struct Renderer {
    ctx: CanvasRenderingContext2d,
    atlas: SpriteAtlas,
}

impl Renderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let atlas = SpriteAtlas::load()?;
        Ok(Self { ctx, atlas })
    }

    /// All sprite sheets decoded and drawable.
    pub fn assets_ready(&self) -> bool {
        self.atlas.player_run.ready()
            && self.atlas.bread.iter().all(|s| s.ready())
            && self.atlas.disco_ball.ready()
    }

    pub fn render(&self, state: &GameState, settings: &Settings) {
        scene::draw(&self.ctx, state, &self.atlas, settings);
    }
}
