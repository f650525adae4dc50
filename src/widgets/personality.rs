//! Driving-personality badge.
//!
//! After a change the profile name is shown, then cross-fades into the
//! profile icon. Opacities come from [`PersonalityFade`](crate::animations::PersonalityFade).

use crate::animations::BadgeOpacity;
use crate::assets::AssetId;
use crate::colors::{TRANSPARENT, WHITE};
use crate::layout::personality_center;
use crate::personality::Personality;
use crate::scene::{Layer, Scene, TextAlign};

use super::primitives::{draw_icon, draw_text};

pub fn draw_personality(
    scene: &mut Scene,
    profile: Personality,
    opacity: BadgeOpacity,
    rhd: bool,
    mute_dm: bool,
    width: f32,
    height: f32,
) {
    let c = personality_center(width, height, rhd, mute_dm);
    if opacity.text > 0.0 {
        draw_text(scene, Layer::Personality, profile.label(), c, 50.0, WHITE.scale_alpha(opacity.text), TextAlign::Center);
    }
    if opacity.icon > 0.0 {
        draw_icon(scene, Layer::Personality, AssetId::Personality(profile), c, TRANSPARENT, opacity.icon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only_right_after_change() {
        let mut scene = Scene::new(2100, 1020);
        let o = BadgeOpacity { text: 1.0, icon: 0.0 };
        draw_personality(&mut scene, Personality::Relaxed, o, false, false, 2100.0, 1020.0);
        let texts: Vec<_> = scene.texts(Layer::Personality).collect();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text, "Relaxed");
        assert_eq!(scene.images(Layer::Personality).count(), 0);
    }

    #[test]
    fn test_cross_fade_draws_both() {
        let mut scene = Scene::new(2100, 1020);
        let o = BadgeOpacity { text: 0.5, icon: 0.5 };
        draw_personality(&mut scene, Personality::Standard, o, false, false, 2100.0, 1020.0);
        let text = scene.texts(Layer::Personality).next().expect("text");
        assert!((127..=128).contains(&text.color.a));
        let icon = scene.images(Layer::Personality).next().expect("icon");
        assert_eq!(icon.id, AssetId::Personality(Personality::Standard));
    }
}
