use colored::Colorize;

type Style = Box<dyn Fn(&str) -> String>;

pub struct Theme {
    pub prompt: String,
    pub prompt_style: Style,
    pub failed_prompt_style: Style,
    pub error_style: Style,
}

impl Theme {
    fn plain(prompt: &str) -> Self {
        Theme {
            prompt: prompt.to_string(),
            prompt_style: Box::new(|s: &str| s.to_string()),
            failed_prompt_style: Box::new(|s: &str| s.to_string()),
            error_style: Box::new(|s: &str| s.to_string()),
        }
    }

    pub fn load_theme(theme_name: &str, prompt: &str) -> Theme {
        match theme_name {
            "plain" => Theme::plain(prompt),
            "dark" => Theme {
                prompt: prompt.to_string(),
                prompt_style: Box::new(|s: &str| s.bright_purple().to_string()),
                failed_prompt_style: Box::new(|s: &str| s.purple().to_string()),
                error_style: Box::new(|s: &str| s.red().to_string()),
            },
            _ => Theme {
                prompt: prompt.to_string(),
                prompt_style: Box::new(|s: &str| s.bright_green().to_string()),
                failed_prompt_style: Box::new(|s: &str| s.bright_red().to_string()),
                error_style: Box::new(|s: &str| s.bright_red().to_string()),
            },
        }
    }

    /// 上一条命令失败时提示符换成失败的颜色
    pub fn render_prompt(&self, last_status: i32) -> String {
        if last_status == 0 {
            (self.prompt_style)(&self.prompt)
        } else {
            (self.failed_prompt_style)(&self.prompt)
        }
    }
}
