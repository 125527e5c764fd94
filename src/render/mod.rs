//! Canvas2D presentation layer
//!
//! Pure read-side of the simulation: draws whatever `GameState` holds
//! and never mutates it. The context is pre-scaled for device pixel
//! ratio by the host, so everything here works in CSS pixels.

use std::collections::HashMap;

use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::assets::{AssetCatalog, AssetKind};
use crate::settings::Settings;
use crate::sim::{CollectibleKind, GameState};

/// Player sprite tilt is proportional to vertical velocity, clamped.
const MAX_TILT_RAD: f64 = 0.4;

fn load_image(url: &str) -> Option<HtmlImageElement> {
    match HtmlImageElement::new() {
        Ok(img) => {
            img.set_src(url);
            Some(img)
        }
        Err(err) => {
            log::error!("Failed to create image element for {url}: {err:?}");
            None
        }
    }
}

pub struct Renderer {
    ctx: CanvasRenderingContext2d,
    background: Option<HtmlImageElement>,
    player: Option<HtmlImageElement>,
    skins: Vec<HtmlImageElement>,
    collectibles: HashMap<CollectibleKind, HtmlImageElement>,
}

impl Renderer {
    pub fn new(ctx: CanvasRenderingContext2d, catalog: &AssetCatalog) -> Self {
        let background = catalog.url(AssetKind::Background).and_then(load_image);
        let player = catalog.url(AssetKind::PlayerSprite).and_then(load_image);
        let skins = (0..catalog.skin_count())
            .filter_map(|i| catalog.url(AssetKind::ObstacleSkin(i)).and_then(load_image))
            .collect();

        let mut collectibles = HashMap::new();
        for kind in [
            CollectibleKind::Coin,
            CollectibleKind::Shield,
            CollectibleKind::SlowMo,
            CollectibleKind::DoubleScore,
        ] {
            if let Some(img) = catalog
                .url(AssetKind::CollectibleSprite(kind))
                .and_then(load_image)
            {
                collectibles.insert(kind, img);
            }
        }

        Self {
            ctx,
            background,
            player,
            skins,
            collectibles,
        }
    }

    /// The images whose decode must complete before the round can start.
    pub fn required_images(&self) -> Vec<HtmlImageElement> {
        let mut images = Vec::new();
        if let Some(bg) = &self.background {
            images.push(bg.clone());
        }
        if let Some(p) = &self.player {
            images.push(p.clone());
        }
        images.extend(self.skins.iter().cloned());
        images
    }

    /// Draw one full frame.
    pub fn draw(&self, state: &GameState, settings: &Settings) {
        let cw = state.bounds.w;
        let ch = state.bounds.h;
        let ctx = &self.ctx;

        ctx.set_global_alpha(1.0);
        self.draw_background(state, cw, ch);

        for o in &state.obstacles {
            let img = self.skins.get(o.skin).or_else(|| self.skins.first());
            let (tx, ty, tw, th) = o.top_rect();
            let (bx, by, bw, bh) = o.bottom_rect(ch);
            match img {
                Some(img) => {
                    // Top segment is drawn flipped so the cap faces the gap
                    ctx.save();
                    let _ = ctx.translate(tx, ty + th);
                    let _ = ctx.scale(1.0, -1.0);
                    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        img, 0.0, 0.0, tw, th,
                    );
                    ctx.restore();
                    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        img, bx, by, bw, bh,
                    );
                }
                None => {
                    ctx.set_fill_style_str("#2e8b57");
                    ctx.fill_rect(tx, ty, tw, th);
                    ctx.fill_rect(bx, by, bw, bh);
                }
            }
        }

        for c in &state.collectibles {
            match self.collectibles.get(&c.kind) {
                Some(img) => {
                    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        img, c.x, c.y, c.w, c.h,
                    );
                }
                None => {
                    ctx.set_fill_style_str(fallback_color(c.kind));
                    ctx.begin_path();
                    let _ = ctx.arc(
                        c.x + c.w / 2.0,
                        c.y + c.h / 2.0,
                        c.w / 2.0,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.fill();
                }
            }
        }

        if !settings.reduced_motion {
            for p in &state.particles {
                ctx.set_global_alpha(p.alpha.clamp(0.0, 1.0));
                ctx.set_fill_style_str("#ffffff");
                ctx.begin_path();
                let _ = ctx.arc(p.pos.x, p.pos.y, p.size, 0.0, std::f64::consts::TAU);
                ctx.fill();
            }
            ctx.set_global_alpha(1.0);
        }

        self.draw_player(state);

        for t in &state.texts {
            ctx.set_global_alpha(t.alpha.clamp(0.0, 1.0));
            ctx.set_fill_style_str("#ffd700");
            ctx.set_font("bold 22px sans-serif");
            let _ = ctx.fill_text(&t.text, t.pos.x, t.pos.y);
        }
        ctx.set_global_alpha(1.0);

        if settings.weather_enabled {
            self.draw_weather(state, settings, cw, ch);
        }

        if state.powerups.shield_active() {
            self.draw_shield_ring(state);
        }
    }

    fn draw_background(&self, state: &GameState, cw: f64, ch: f64) {
        let ctx = &self.ctx;
        let Some(bg) = &self.background else {
            ctx.set_fill_style_str("#87ceeb");
            ctx.fill_rect(0.0, 0.0, cw, ch);
            return;
        };

        let nat_w = bg.natural_width() as f64;
        let nat_h = bg.natural_height() as f64;
        if nat_w <= 0.0 || nat_h <= 0.0 {
            ctx.set_fill_style_str("#87ceeb");
            ctx.fill_rect(0.0, 0.0, cw, ch);
            return;
        }

        // Cover-scale to canvas height, wrap horizontally on bg_x
        let scaled_w = nat_w * (ch / nat_h);
        let mut x = state.bg_x.rem_euclid(scaled_w) - scaled_w;
        while x < cw {
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(bg, x, 0.0, scaled_w, ch);
            x += scaled_w;
        }
    }

    fn draw_player(&self, state: &GameState) {
        let ctx = &self.ctx;
        let p = &state.player;
        let tilt = (p.vel / 40.0).clamp(-MAX_TILT_RAD, MAX_TILT_RAD);

        ctx.save();
        let _ = ctx.translate(p.x + p.w / 2.0, p.y + p.h / 2.0);
        let _ = ctx.rotate(tilt);
        match &self.player {
            Some(img) => {
                let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    img,
                    -p.w / 2.0,
                    -p.h / 2.0,
                    p.w,
                    p.h,
                );
            }
            None => {
                ctx.set_fill_style_str("#f4c20d");
                ctx.fill_rect(-p.w / 2.0, -p.h / 2.0, p.w, p.h);
            }
        }
        ctx.restore();
    }

    fn draw_weather(&self, state: &GameState, settings: &Settings, cw: f64, ch: f64) {
        let ctx = &self.ctx;

        if !state.weather.drops.is_empty() {
            ctx.set_stroke_style_str("rgba(174, 194, 224, 0.55)");
            ctx.set_line_width(1.5);
            ctx.begin_path();
            for d in &state.weather.drops {
                ctx.move_to(d.pos.x, d.pos.y);
                ctx.line_to(d.pos.x - 2.0, d.pos.y + d.len);
            }
            ctx.stroke();
        }

        if state.weather.fog_alpha > 0.0 {
            ctx.set_global_alpha(state.weather.fog_alpha.clamp(0.0, 1.0));
            ctx.set_fill_style_str("#c8c8d2");
            ctx.fill_rect(0.0, 0.0, cw, ch);
            ctx.set_global_alpha(1.0);
        }

        if state.weather.lightning_alpha > 0.0 && !settings.reduced_motion {
            ctx.set_global_alpha(state.weather.lightning_alpha.clamp(0.0, 1.0));
            ctx.set_fill_style_str("#ffffff");
            ctx.fill_rect(0.0, 0.0, cw, ch);
            ctx.set_global_alpha(1.0);
        }
    }

    fn draw_shield_ring(&self, state: &GameState) {
        let ctx = &self.ctx;
        let p = &state.player;
        ctx.set_stroke_style_str("rgba(80, 200, 255, 0.8)");
        ctx.set_line_width(3.0);
        ctx.begin_path();
        let _ = ctx.arc(
            p.x + p.w / 2.0,
            p.y + p.h / 2.0,
            p.w.max(p.h) * 0.75,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.stroke();
    }
}

fn fallback_color(kind: CollectibleKind) -> &'static str {
    match kind {
        CollectibleKind::Coin => "#ffd700",
        CollectibleKind::Shield => "#50c8ff",
        CollectibleKind::SlowMo => "#b07cff",
        CollectibleKind::DoubleScore => "#ff7c5c",
    }
}
