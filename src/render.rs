//! Canvas2D renderer
//!
//! Pure read-side: walks the simulation state once per frame and issues
//! drawing calls. Nothing here mutates the simulation.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::sim::{AllyPhase, GameState, RunPhase};
use crate::unit_from_angle;

pub struct Renderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl Renderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, wasm_bindgen::JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            ctx,
            width: f64::from(canvas.width()),
            height: f64::from(canvas.height()),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = f64::from(width);
        self.height = f64::from(height);
    }

    /// Draw one complete frame.
    pub fn draw(&self, state: &GameState) {
        let ctx = &self.ctx;

        // Scale logical field coordinates to the backing canvas
        let sx = self.width / f64::from(state.config.width);
        let sy = self.height / f64::from(state.config.height);
        ctx.save();
        let _ = ctx.scale(sx, sy);

        ctx.set_fill_style_str("#0a0a14");
        ctx.fill_rect(
            0.0,
            0.0,
            f64::from(state.config.width),
            f64::from(state.config.height),
        );

        for projectile in &state.projectiles {
            self.draw_projectile_trail(projectile);
        }
        for snake in &state.snakes {
            self.draw_snake(snake);
        }
        for projectile in &state.projectiles {
            self.draw_projectile(projectile);
        }
        if let Some(ally) = &state.ally {
            self.draw_ally(ally);
        }
        if state.phase != RunPhase::Idle {
            self.draw_player(&state.player);
        }

        ctx.restore();
    }

    fn draw_snake(&self, snake: &crate::sim::Snake) {
        let ctx = &self.ctx;

        // Body segments from tail to head, dimmer and smaller toward the tail
        let n = snake.segments.len();
        for (i, seg) in snake.segments.iter().enumerate().rev() {
            let shrink = 1.0 - 0.5 * (i + 1) as f32 / (n + 1) as f32;
            let light = if snake.frozen { 70.0 } else { 35.0 };
            ctx.set_fill_style_str(&format!("hsl({}, 60%, {}%)", snake.hue, light));
            ctx.begin_path();
            let _ = ctx.arc(
                f64::from(seg.x),
                f64::from(seg.y),
                f64::from(snake.radius * shrink),
                0.0,
                std::f64::consts::TAU,
            );
            ctx.fill();
        }

        // Head, flashing white briefly after a hit
        let color = if snake.hit_flash > 0.0 {
            "hsl(0, 0%, 95%)".to_string()
        } else if snake.frozen {
            format!("hsl({}, 30%, 75%)", snake.hue)
        } else {
            format!("hsl({}, 75%, 50%)", snake.hue)
        };
        ctx.set_fill_style_str(&color);
        ctx.begin_path();
        let _ = ctx.arc(
            f64::from(snake.pos.x),
            f64::from(snake.pos.y),
            f64::from(snake.radius),
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();

        self.draw_health_arc(
            snake.pos.x,
            snake.pos.y,
            snake.radius + 4.0,
            snake.health / snake.max_health,
        );
    }

    fn draw_projectile_trail(&self, projectile: &crate::sim::Projectile) {
        let ctx = &self.ctx;
        let n = projectile.trail.len();
        for (i, p) in projectile.trail.iter().enumerate() {
            let fade = 1.0 - (i + 1) as f32 / (n + 1) as f32;
            ctx.set_fill_style_str(&format!(
                "hsla({}, 90%, 65%, {:.2})",
                projectile.hue,
                fade * 0.5
            ));
            ctx.begin_path();
            let _ = ctx.arc(
                f64::from(p.x),
                f64::from(p.y),
                f64::from(projectile.radius * fade),
                0.0,
                std::f64::consts::TAU,
            );
            ctx.fill();
        }
    }

    fn draw_projectile(&self, projectile: &crate::sim::Projectile) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(&format!("hsl({}, 90%, 70%)", projectile.hue));
        ctx.begin_path();
        let _ = ctx.arc(
            f64::from(projectile.pos.x),
            f64::from(projectile.pos.y),
            f64::from(projectile.radius),
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();
    }

    fn draw_player(&self, player: &crate::sim::Player) {
        let ctx = &self.ctx;

        // Blink while invulnerable
        if player.invuln > 0.0 && (player.invuln * 10.0) as u32 % 2 == 0 {
            return;
        }

        if player.shield {
            ctx.set_stroke_style_str("hsl(200, 90%, 70%)");
            ctx.set_line_width(2.0);
            ctx.begin_path();
            let _ = ctx.arc(
                f64::from(player.pos.x),
                f64::from(player.pos.y),
                f64::from(player.radius + 6.0),
                0.0,
                std::f64::consts::TAU,
            );
            ctx.stroke();
        }

        ctx.set_fill_style_str("hsl(180, 80%, 60%)");
        ctx.begin_path();
        let _ = ctx.arc(
            f64::from(player.pos.x),
            f64::from(player.pos.y),
            f64::from(player.radius),
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();

        // Barrel, pushed back briefly by the shoot animation
        let kick = if player.shoot_anim > 0.0 { -3.0 } else { 0.0 };
        let dir = unit_from_angle(player.rotation);
        let tip = player.pos + dir * (player.radius + 8.0 + kick);
        ctx.set_stroke_style_str("hsl(180, 80%, 80%)");
        ctx.set_line_width(4.0);
        ctx.begin_path();
        ctx.move_to(f64::from(player.pos.x), f64::from(player.pos.y));
        ctx.line_to(f64::from(tip.x), f64::from(tip.y));
        ctx.stroke();
    }

    fn draw_ally(&self, ally: &crate::sim::Ally) {
        let ctx = &self.ctx;
        ctx.set_global_alpha(f64::from(ally.opacity));

        let color = match ally.phase {
            AllyPhase::Descending | AllyPhase::Landing => "hsl(50, 90%, 70%)",
            _ => "hsl(50, 80%, 55%)",
        };
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        let _ = ctx.arc(
            f64::from(ally.pos.x),
            f64::from(ally.pos.y),
            f64::from(ally.radius),
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();

        let dir = unit_from_angle(ally.rotation);
        let tip = ally.pos + dir * (ally.radius + 6.0);
        ctx.set_stroke_style_str("hsl(50, 80%, 80%)");
        ctx.set_line_width(3.0);
        ctx.begin_path();
        ctx.move_to(f64::from(ally.pos.x), f64::from(ally.pos.y));
        ctx.line_to(f64::from(tip.x), f64::from(tip.y));
        ctx.stroke();

        ctx.set_global_alpha(1.0);
    }

    /// Health fraction as a partial ring above an entity
    fn draw_health_arc(&self, x: f32, y: f32, radius: f32, fraction: f32) {
        if fraction >= 1.0 {
            return;
        }
        let ctx = &self.ctx;
        ctx.set_stroke_style_str("hsl(0, 80%, 55%)");
        ctx.set_line_width(2.0);
        ctx.begin_path();
        let start = -std::f64::consts::FRAC_PI_2;
        let _ = ctx.arc(
            f64::from(x),
            f64::from(y),
            f64::from(radius),
            start,
            start + std::f64::consts::TAU * f64::from(fraction.clamp(0.0, 1.0)),
        );
        ctx.stroke();
    }
}
