use anyhow::{anyhow, Context, Result};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use pulldown_cmark::{html, Options, Parser};
use rust_embed::RustEmbed;
use tracing::error;

// Legal documents embedded at compile time
#[derive(RustEmbed)]
#[folder = "content/"]
pub struct LegalContent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegalPage {
    Terms,
    Privacy,
}

struct ContactLink {
    label: &'static str,
    href: &'static str,
}

impl LegalPage {
    fn file(self) -> &'static str {
        match self {
            LegalPage::Terms => "terms.md",
            LegalPage::Privacy => "privacy.md",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            LegalPage::Terms => "Nextrip 使用条款",
            LegalPage::Privacy => "Nextrip 隐私政策",
        }
    }

    fn badge(self) -> &'static str {
        match self {
            LegalPage::Terms => "法律文档",
            LegalPage::Privacy => "隐私保护",
        }
    }

    fn help_heading(self) -> &'static str {
        match self {
            LegalPage::Terms => "需要帮助？",
            LegalPage::Privacy => "隐私问题咨询",
        }
    }

    fn help_text(self) -> &'static str {
        match self {
            LegalPage::Terms => "如果您对我们的使用条款有任何疑问，请随时联系我们的客服团队。",
            LegalPage::Privacy => {
                "如果您对我们的隐私政策有任何疑问或需要行使您的数据权利，请联系我们的数据保护团队。"
            }
        }
    }

    fn contacts(self) -> &'static [ContactLink] {
        match self {
            LegalPage::Terms => &[
                ContactLink {
                    label: "发送邮件",
                    href: "mailto:legal@nextrip.com",
                },
                ContactLink {
                    label: "电话咨询",
                    href: "tel:400-123-4567",
                },
            ],
            LegalPage::Privacy => &[
                ContactLink {
                    label: "隐私邮箱",
                    href: "mailto:privacy@nextrip.com",
                },
                ContactLink {
                    label: "数据保护官",
                    href: "mailto:dpo@nextrip.com",
                },
                ContactLink {
                    label: "电话咨询",
                    href: "tel:400-123-4567",
                },
            ],
        }
    }
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

/// Render a legal page: badge, the embedded markdown, then the contact block
pub fn render_legal_page(page: LegalPage) -> Result<String> {
    let file = LegalContent::get(page.file())
        .ok_or_else(|| anyhow!("missing embedded content: {}", page.file()))?;
    let markdown = std::str::from_utf8(&file.data)
        .with_context(|| format!("{} is not valid UTF-8", page.file()))?;

    let contacts: String = page
        .contacts()
        .iter()
        .map(|c| format!("<a href=\"{}\">{}</a>\n", c.href, c.label))
        .collect();

    let body = format!(
        "<main>\n<p class=\"badge\">{badge}</p>\n<article>\n{content}</article>\n\
         <aside>\n<h3>{heading}</h3>\n<p>{text}</p>\n{contacts}</aside>\n</main>\n",
        badge = page.badge(),
        content = markdown_to_html(markdown),
        heading = page.help_heading(),
        text = page.help_text(),
    );

    Ok(page_shell(page.title(), &body))
}

fn legal_response(page: LegalPage) -> Response {
    match render_legal_page(page) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render {:?} page: {:#}", page, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// `GET /terms`
pub async fn terms_handler() -> Response {
    legal_response(LegalPage::Terms)
}

/// `GET /privacy`
pub async fn privacy_handler() -> Response {
    legal_response(LegalPage::Privacy)
}

/// Fallback for every unknown path
pub async fn not_found_handler() -> (StatusCode, Html<String>) {
    let body = "<main>\n<h1>功能开发中</h1>\n<p>该功能正在紧张开发中，敬请期待</p>\n\
                <p>我们正在努力为您打造更好的体验，该功能即将上线。感谢您的耐心等待，我们会尽快完善相关功能。</p>\n\
                <a href=\"/\">返回首页</a>\n<a href=\"javascript:history.back()\">返回上一页</a>\n\
                <p>如有疑问或建议，请联系我们的客服团队</p>\n</main>\n";
    (StatusCode::NOT_FOUND, Html(page_shell("功能开发中", body)))
}
