//! Sprite-sheet atlas
//!
//! Sheets are plain grid strips: `cols * rows` frames of equal size.
//! Images load in the background; `drawn` calls silently skip until the
//! browser has decoded them, so the game loop never blocks on assets.

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::sim::Tier;

/// One sheet plus its frame grid.
pub struct SpriteSheet {
    image: HtmlImageElement,
    cols: u32,
    rows: u32,
}

impl SpriteSheet {
    pub fn load(url: &str, cols: u32, rows: u32) -> Result<Self, JsValue> {
        let image = HtmlImageElement::new()?;
        image.set_src(url);
        Ok(Self { image, cols, rows })
    }

    pub fn ready(&self) -> bool {
        self.image.complete() && self.image.natural_width() > 0
    }

    fn frame_size(&self) -> (f64, f64) {
        (
            self.image.natural_width() as f64 / self.cols as f64,
            self.image.natural_height() as f64 / self.rows as f64,
        )
    }

    /// Draw one frame centered at (x, y), scaled.
    pub fn draw_frame(
        &self,
        ctx: &CanvasRenderingContext2d,
        frame: u32,
        x: f64,
        y: f64,
        scale: f64,
    ) {
        if !self.ready() {
            return;
        }
        let (fw, fh) = self.frame_size();
        let frame = frame % (self.cols * self.rows);
        let sx = (frame % self.cols) as f64 * fw;
        let sy = (frame / self.cols) as f64 * fh;
        let dw = fw * scale;
        let dh = fh * scale;
        let _ = ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &self.image,
                sx,
                sy,
                fw,
                fh,
                x - dw / 2.0,
                y - dh / 2.0,
                dw,
                dh,
            );
    }
}

/// Every sheet the scene needs, loaded up front.
pub struct SpriteAtlas {
    pub player_run: SpriteSheet,
    pub player_damage: SpriteSheet,
    pub player_recover: SpriteSheet,
    pub player_defeat: SpriteSheet,
    /// One bread sheet per health tier
    pub bread: [SpriteSheet; 3],
    pub disco_ball: SpriteSheet,
}

impl SpriteAtlas {
    pub fn load() -> Result<Self, JsValue> {
        Ok(Self {
            player_run: SpriteSheet::load("assets/player_run.png", 8, 1)?,
            player_damage: SpriteSheet::load("assets/player_damage.png", 8, 1)?,
            player_recover: SpriteSheet::load("assets/player_recover.png", 6, 1)?,
            player_defeat: SpriteSheet::load("assets/player_defeat.png", 6, 1)?,
            bread: [
                SpriteSheet::load("assets/bread_low.png", 13, 1)?,
                SpriteSheet::load("assets/bread_mid.png", 13, 1)?,
                SpriteSheet::load("assets/bread_high.png", 13, 1)?,
            ],
            disco_ball: SpriteSheet::load("assets/disco_ball.png", 4, 1)?,
        })
    }

    pub fn bread_for(&self, tier: Tier) -> &SpriteSheet {
        &self.bread[tier.index()]
    }
}
