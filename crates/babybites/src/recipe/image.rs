//! Photo prompt for the image model.

use serde::{Deserialize, Serialize};

/// Aesthetic of the generated dish photo.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ImageStyle {
    /// Candid home photo: window light, messy texture, no studio gloss.
    #[default]
    Documentary,
    /// Bright, styled food photography.
    Studio,
}

impl std::str::FromStr for ImageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "documentary" => Ok(ImageStyle::Documentary),
            "studio" => Ok(ImageStyle::Studio),
            other => Err(format!(
                "unknown image style '{other}' (expected documentary or studio)"
            )),
        }
    }
}

/// Build the image prompt for `dish_name` in the default documentary style.
pub fn build_image_prompt(dish_name: &str, baby_age_months: u32) -> String {
    build_image_prompt_styled(dish_name, baby_age_months, ImageStyle::Documentary)
}

/// Build the image prompt for `dish_name` in the given style.
pub fn build_image_prompt_styled(dish_name: &str, baby_age_months: u32, style: ImageStyle) -> String {
    match style {
        ImageStyle::Documentary => format!(
            "A candid, documentary-style photograph of homemade {dish_name} for a \
             {baby_age_months}-month-old baby. Shot using natural daylight from a side \
             window. The food texture looks real, slightly imperfect, and messy. Served \
             in a simple silicone baby bowl on a wooden table. Shallow depth of field, \
             film grain texture. NOT a studio photo, NO artificial gloss. Looks like a \
             real photo taken by a parent at home."
        ),
        ImageStyle::Studio => format!(
            "A highly realistic food photograph of {dish_name} for a \
             {baby_age_months}-month-old baby. Healthy, high-calorie, salt-free baby \
             food. Bright lighting, professional food styling, cute baby bowl."
        ),
    }
}
