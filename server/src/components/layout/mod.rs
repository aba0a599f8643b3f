use maud::{html, Markup, Render};

pub struct Page {
    pub title: String,
    pub content: Box<dyn Render>,
}

impl Page {
    pub fn new(title: String, content: Box<dyn Render>) -> Self {
        Self { title, content }
    }
}

impl Render for Page {
    fn render(&self) -> Markup {
        html! {
            head {
                title { (self.title) }
                script src="https://unpkg.com/@tailwindcss/browser@4" {}
                meta name="viewport" content="width=device-width, initial-scale=1.0";
            }

            div class="min-h-screen bg-gradient-to-br from-green-50 via-emerald-50 to-lime-50 py-6 md:py-10 px-2 sm:px-4 lg:px-8" {
                (self.content.render())

                div class="mt-8 text-center text-sm text-gray-500" {
                    p { "agrigate - equipment platform OAuth demo" }
                }
            }
        }
    }
}

impl axum::response::IntoResponse for Page {
    fn into_response(self) -> axum::response::Response {
        self.render().into_response()
    }
}

pub struct Card {
    pub content: Box<dyn Render>,
    pub max_width: Option<String>,
}

impl Card {
    pub fn new(content: impl Render + 'static) -> Self {
        Self {
            content: Box::new(content),
            max_width: None,
        }
    }

    pub fn with_max_width(mut self, max_width: &str) -> Self {
        self.max_width = Some(max_width.to_string());
        self
    }
}

impl Render for Card {
    fn render(&self) -> Markup {
        let width_class = self.max_width.as_deref().unwrap_or("max-w-md");

        html! {
            div class={(width_class) " mx-auto bg-white rounded-xl border border-gray-100 shadow-lg overflow-hidden w-full mb-6"} {
                (self.content.render())
            }
        }
    }
}

pub struct ContentSection {
    pub padding: String,
    pub content: Box<dyn Render>,
}

impl ContentSection {
    pub fn new(content: impl Render + 'static) -> Self {
        Self {
            padding: "px-6 py-5 sm:px-8 sm:py-6".to_string(),
            content: Box::new(content),
        }
    }
}

impl Render for ContentSection {
    fn render(&self) -> Markup {
        html! {
            div class=(self.padding) {
                (self.content.render())
            }
        }
    }
}
