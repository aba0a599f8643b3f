use maud::{html, Markup, Render};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ButtonVariant {
    Primary,
    Secondary,
}

pub struct Button {
    pub text: String,
    pub href: Option<String>,
    pub variant: ButtonVariant,
    pub full_width: bool,
    pub button_type: Option<String>,
}

impl Button {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            href: None,
            variant: ButtonVariant::Primary,
            full_width: false,
            button_type: None,
        }
    }

    pub fn primary(text: &str) -> Self {
        Self::new(text)
    }

    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn full_width(mut self, full_width: bool) -> Self {
        self.full_width = full_width;
        self
    }

    fn variant_classes(&self) -> &'static str {
        match self.variant {
            ButtonVariant::Primary => "bg-green-700 hover:bg-green-800 active:bg-green-900 text-white focus:ring-2 focus:ring-green-500 focus:ring-offset-2",
            ButtonVariant::Secondary => "bg-white hover:bg-gray-50 active:bg-gray-100 text-green-700 border border-green-300 hover:border-green-400 focus:ring-2 focus:ring-green-500 focus:ring-offset-2",
        }
    }
}

impl Render for Button {
    fn render(&self) -> Markup {
        let width_class = if self.full_width { "w-full" } else { "" };
        let classes = format!(
            "inline-flex items-center justify-center py-2 px-4 text-sm sm:text-base font-medium rounded-lg transition-colors cursor-pointer {} {}",
            self.variant_classes(),
            width_class
        );

        match &self.href {
            Some(href) => html! {
                a href=(href) class=(classes) { (self.text) }
            },
            None => html! {
                button type=(self.button_type.as_deref().unwrap_or("submit")) class=(classes) {
                    (self.text)
                }
            },
        }
    }
}
