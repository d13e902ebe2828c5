//! Frame composition
//!
//! Pure read of the simulation state: back-to-front, background first,
//! then speed lines, breads far-to-near, the runner and their disco
//! ball, particles, floating text, and finally the full-screen damage
//! and overdrive layers.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::Settings;
use crate::sim::fx::speedline_thickness;
use crate::sim::{Bread, FloatKind, GameState, PlayerAnim, Tier};

use super::sprites::SpriteAtlas;

const DAMAGE_WORDS: [&str; 8] = [
    "OUCH!", "YIKES!", "OOF!", "NOO!", "ACK!", "WHOOPS!", "DANG!", "DROPPED!",
];
const REWARD_WORDS: [&str; 8] = [
    "BREAD!", "WOW!", "YUM!", "EPIC!", "NICE!", "TASTY!", "SWEET!", "CRUNCHY!",
];

/// Burst particle palette, indexed by `Particle::color_index`
const PARTICLE_COLORS: [&str; 8] = [
    "#ffd166", "#ef476f", "#06d6a0", "#118ab2", "#f78c6b", "#c77dff", "#80ed99", "#ffe066",
];

/// Sky gradient stops per tier (top, bottom)
fn tier_sky(tier: Tier) -> (&'static str, &'static str) {
    match tier {
        Tier::Low => ("#1a1a2e", "#3d2645"),
        Tier::Mid => ("#16324f", "#2d6a8f"),
        Tier::High => ("#3c096c", "#ff6d00"),
    }
}

pub fn draw(
    ctx: &CanvasRenderingContext2d,
    state: &GameState,
    atlas: &SpriteAtlas,
    settings: &Settings,
) {
    let w = state.viewport.width as f64;
    let h = state.viewport.height as f64;

    draw_background(ctx, state, w, h);

    if settings.effective_speed_lines() {
        draw_speed_lines(ctx, state, w, h);
    }

    draw_breads(ctx, state, atlas);
    draw_player(ctx, state, atlas, w, h);

    if settings.particles {
        draw_particles(ctx, state);
    }

    draw_floating_texts(ctx, state);

    if settings.effective_damage_flash() {
        draw_damage_flash(ctx, state, w, h);
    }

    if state.overdrive && settings.effective_action_lines() {
        draw_action_lines(ctx, state, w, h);
    }
}

fn fill_vertical_gradient(
    ctx: &CanvasRenderingContext2d,
    top: &str,
    bottom: &str,
    alpha: f64,
    w: f64,
    h: f64,
) {
    let gradient = ctx.create_linear_gradient(0.0, 0.0, 0.0, h);
    let _ = gradient.add_color_stop(0.0, top);
    let _ = gradient.add_color_stop(1.0, bottom);
    ctx.set_global_alpha(alpha);
    ctx.set_fill_style(&JsValue::from(gradient));
    ctx.fill_rect(0.0, 0.0, w, h);
    ctx.set_global_alpha(1.0);
}

/// Previous tier's sky fades under the current one during a crossfade.
fn draw_background(ctx: &CanvasRenderingContext2d, state: &GameState, w: f64, h: f64) {
    let fx = &state.fx;
    let (from_top, from_bottom) = tier_sky(fx.bg_from);
    let (to_top, to_bottom) = tier_sky(fx.bg_to);
    fill_vertical_gradient(ctx, from_top, from_bottom, 1.0, w, h);
    if fx.bg_fade > 0.0 {
        fill_vertical_gradient(ctx, to_top, to_bottom, fx.bg_fade as f64, w, h);
    }
}

fn draw_speed_lines(ctx: &CanvasRenderingContext2d, state: &GameState, w: f64, h: f64) {
    ctx.set_stroke_style(&JsValue::from_str("rgba(255,255,255,0.25)"));
    for line in &state.fx.speed_lines {
        let progress = line.progress(state.viewport.height);
        ctx.set_line_width(speedline_thickness(progress) as f64);
        // Lines hug the screen edges, fanning slightly outward
        for x_frac in [0.08, 0.92] {
            let spread = (x_frac - 0.5) * progress as f64 * 30.0;
            let x = w * x_frac + spread;
            ctx.begin_path();
            ctx.move_to(x, line.y as f64 - 20.0);
            ctx.line_to(x, line.y as f64 + 20.0 + 40.0 * progress as f64);
            ctx.stroke();
        }
    }
}

fn draw_breads(ctx: &CanvasRenderingContext2d, state: &GameState, atlas: &SpriteAtlas) {
    // Bread look follows the health tier, not the spawner's difficulty
    let sheet = atlas.bread_for(state.tier);
    // Far breads first so near ones overlap them
    let mut order: Vec<&Bread> = state.spawner.breads.iter().collect();
    order.sort_by(|a, b| a.z.total_cmp(&b.z));
    for bread in order {
        let pos = bread.screen_position(state.viewport, &state.tuning);
        let scale = bread.scale(&state.tuning) as f64;
        sheet.draw_frame(ctx, bread.anim_frame, pos.x as f64, pos.y as f64, scale);
    }
}

fn draw_player(
    ctx: &CanvasRenderingContext2d,
    state: &GameState,
    atlas: &SpriteAtlas,
    _w: f64,
    h: f64,
) {
    let player = &state.player;
    let sheet = match player.anim {
        PlayerAnim::Run => &atlas.player_run,
        PlayerAnim::DamageHold => &atlas.player_damage,
        PlayerAnim::DamageRecover => &atlas.player_recover,
        PlayerAnim::Defeat => &atlas.player_defeat,
    };
    let x = player.x as f64;
    let y = h * state.tuning.near_y_frac as f64;
    let scale = state.tuning.scale_near as f64;
    sheet.draw_frame(ctx, player.frame, x, y, scale);

    // Disco ball bobs above the runner; rainbow glow in overdrive
    let bob = (state.game_time * 3.0).sin() as f64 * 6.0;
    let ball_y = y - 90.0 * scale + bob;
    if state.overdrive {
        ctx.set_fill_style(&JsValue::from_str(&format!(
            "hsla({:.0}, 100%, 60%, 0.35)",
            state.fx.rainbow_hue
        )));
        ctx.begin_path();
        let _ = ctx.arc(x, ball_y, 26.0 * scale, 0.0, std::f64::consts::TAU);
        ctx.fill();
    }
    let ball_frame = (state.game_time * 6.0) as u32;
    atlas.disco_ball.draw_frame(ctx, ball_frame, x, ball_y, scale * 0.5);
}

fn draw_particles(ctx: &CanvasRenderingContext2d, state: &GameState) {
    for p in &state.fx.particles {
        let color = if p.rainbow {
            format!("hsla({:.0}, 100%, 60%, {:.2})", p.hue, p.life())
        } else {
            let base = PARTICLE_COLORS[p.color_index as usize % PARTICLE_COLORS.len()];
            ctx.set_global_alpha(p.life() as f64);
            base.to_string()
        };
        ctx.set_fill_style(&JsValue::from_str(&color));
        ctx.begin_path();
        let _ = ctx.arc(
            p.pos.x as f64,
            p.pos.y as f64,
            p.size.max(0.5) as f64,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();
        ctx.set_global_alpha(1.0);
    }
}

fn draw_floating_texts(ctx: &CanvasRenderingContext2d, state: &GameState) {
    ctx.set_text_align("center");
    for text in &state.fx.texts {
        let (word, color, font) = match text.kind {
            FloatKind::Damage => (
                DAMAGE_WORDS[text.word_index as usize % DAMAGE_WORDS.len()],
                "#ff4d6d".to_string(),
                "bold 28px sans-serif",
            ),
            FloatKind::Reward => (
                REWARD_WORDS[text.word_index as usize % REWARD_WORDS.len()],
                format!("hsl({:.0}, 100%, 65%)", text.hue),
                "bold 32px sans-serif",
            ),
        };
        ctx.set_global_alpha(text.alpha() as f64);
        ctx.set_font(font);
        ctx.set_fill_style(&JsValue::from_str(&color));
        let _ = ctx.fill_text(word, text.x as f64, text.y as f64);
    }
    ctx.set_global_alpha(1.0);
}

/// Red vignette, strongest at the edges, driven by the flash timer.
fn draw_damage_flash(ctx: &CanvasRenderingContext2d, state: &GameState, w: f64, h: f64) {
    let strength = state.fx.damage_flash_strength(&state.tuning) as f64;
    if strength <= 0.0 {
        return;
    }
    let gradient = ctx
        .create_radial_gradient(w / 2.0, h / 2.0, h * 0.25, w / 2.0, h / 2.0, h * 0.75);
    if let Ok(gradient) = gradient {
        let _ = gradient.add_color_stop(0.0, "rgba(255,0,0,0)");
        let _ = gradient.add_color_stop(1.0, &format!("rgba(255,0,0,{:.3})", 0.5 * strength));
        ctx.set_fill_style(&JsValue::from(gradient));
        ctx.fill_rect(0.0, 0.0, w, h);
    }
}

/// Manga-style radial lines from the screen center during overdrive.
fn draw_action_lines(ctx: &CanvasRenderingContext2d, state: &GameState, w: f64, h: f64) {
    let fx = &state.fx;
    let cx = w / 2.0;
    let cy = h * state.tuning.far_y_frac as f64;
    ctx.set_line_width(2.0);
    ctx.set_global_alpha(0.5);
    for line in &fx.action_lines {
        let angle = (line.angle + fx.action_angle) as f64;
        let len = line.length as f64 * h;
        let inner = h * 0.35;
        ctx.set_stroke_style(&JsValue::from_str(&format!(
            "hsl({:.0}, 100%, 70%)",
            line.hue
        )));
        ctx.begin_path();
        ctx.move_to(cx + angle.cos() * inner, cy + angle.sin() * inner);
        ctx.line_to(cx + angle.cos() * (inner + len), cy + angle.sin() * (inner + len));
        ctx.stroke();
    }
    ctx.set_global_alpha(1.0);
}
