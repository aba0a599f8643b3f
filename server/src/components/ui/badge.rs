use maud::{html, Markup, Render};

#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(dead_code)]
pub enum BadgeColor {
    Green,
    Red,
    Yellow,
    Gray,
}

pub struct Badge {
    pub text: String,
    pub color: BadgeColor,
}

impl Badge {
    pub fn new(text: &str, color: BadgeColor) -> Self {
        Self {
            text: text.to_string(),
            color,
        }
    }

    fn color_classes(&self) -> &'static str {
        match self.color {
            BadgeColor::Green => "bg-green-100 text-green-800",
            BadgeColor::Red => "bg-red-100 text-red-800",
            BadgeColor::Yellow => "bg-yellow-100 text-yellow-800",
            BadgeColor::Gray => "bg-gray-100 text-gray-800",
        }
    }
}

impl Render for Badge {
    fn render(&self) -> Markup {
        let classes = format!(
            "{} text-xs font-medium px-2 py-1 rounded-full",
            self.color_classes()
        );

        html! {
            span class=(classes) { (self.text) }
        }
    }
}
