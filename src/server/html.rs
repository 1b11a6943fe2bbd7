use std::{fmt, str::FromStr};

use crate::foundation::{
    error::{InputField, RelayError},
    ids::{PageIndex, WorkId},
};

/// Presentation language for HTML pages and client-facing error text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Simplified Chinese.
    Zh,
}

/// All user-visible strings for one locale.
#[derive(Debug)]
pub struct Strings {
    /// `lang` attribute value.
    pub lang: &'static str,
    /// Index page title.
    pub index_title: &'static str,
    /// Index page heading (may contain `<br>`).
    pub index_heading: &'static str,
    /// Label of the work id field.
    pub work_label: &'static str,
    /// Label of the page field.
    pub page_label: &'static str,
    /// Submit button text.
    pub submit: &'static str,
    /// Title prefix of animated view pages.
    pub animated_title: &'static str,
    /// Download link text on animated view pages.
    pub download_gif: &'static str,
    /// Non-numeric work id.
    pub invalid_work: &'static str,
    /// Negative or non-integer page.
    pub invalid_page: &'static str,
    /// Page beyond the last page.
    pub page_out_of_range: &'static str,
    /// Resource limits exceeded.
    pub too_large: &'static str,
    /// Upstream fetch or reconstruction failed.
    pub upstream_failed: &'static str,
    /// Anything else.
    pub internal: &'static str,
}

const EN: Strings = Strings {
    lang: "en",
    index_title: "Pixiv Image/GIF Viewer",
    index_heading: "Enter Pixiv Illustration ID (PID)<br>to view static image or animated GIF",
    work_label: "PID",
    page_label: "Page",
    submit: "View",
    animated_title: "Pixiv Ugoira",
    download_gif: "Download as GIF",
    invalid_work: "PID must be numeric",
    invalid_page: "Page must be a non-negative integer",
    page_out_of_range: "Page out of range",
    too_large: "Animation too large",
    upstream_failed: "Failed to fetch from pixiv",
    internal: "Internal error",
};

const ZH: Strings = Strings {
    lang: "zh-CN",
    index_title: "Pixiv 原图/GIF 下载",
    index_heading: "输入 Pixiv 作品 PID<br>查看静图或动图 GIF",
    work_label: "PID",
    page_label: "页码",
    submit: "查看",
    animated_title: "Pixiv 动图",
    download_gif: "点击下载为GIF文件",
    invalid_work: "PID 必须为数字",
    invalid_page: "页码必须为非负整数",
    page_out_of_range: "页码超范围",
    too_large: "动图过大",
    upstream_failed: "从 pixiv 获取失败",
    internal: "内部错误",
};

impl Locale {
    /// String table for this locale.
    pub fn strings(self) -> &'static Strings {
        match self {
            Self::En => &EN,
            Self::Zh => &ZH,
        }
    }

    /// Short reason shown to the caller for `err`.
    pub fn error_message(self, err: &RelayError) -> &'static str {
        let s = self.strings();
        match err {
            RelayError::InvalidInput { field, .. } => match field {
                InputField::Work => s.invalid_work,
                InputField::Page => s.invalid_page,
            },
            RelayError::PageOutOfRange { .. } => s.page_out_of_range,
            RelayError::LimitExceeded(_) => s.too_large,
            RelayError::UpstreamStatus { .. }
            | RelayError::UpstreamRejected(_)
            | RelayError::UpstreamUnavailable(_)
            | RelayError::MalformedBundle(_)
            | RelayError::UnsupportedFrame(_) => s.upstream_failed,
            RelayError::Encode(_) | RelayError::Cancelled | RelayError::Other(_) => s.internal,
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Self::En),
            "zh" | "zh-cn" | "chinese" => Ok(Self::Zh),
            other => Err(format!("unknown locale '{other}' (expected en or zh)")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::En => "en",
            Self::Zh => "zh",
        })
    }
}

/// URL of the still-image fetch endpoint for one page.
pub fn still_src(work: &WorkId, page: PageIndex) -> String {
    format!("/fetch/static?work={work}&page={page}")
}

/// URL of the reconstructed-animation fetch endpoint.
pub fn animated_src(work: &WorkId) -> String {
    format!("/fetch/animated?work={work}")
}

/// Landing page with the lookup form.
pub fn index_page(locale: Locale) -> String {
    let s = locale.strings();
    format!(
        r#"<!doctype html>
<html lang="{lang}">
  <head><meta charset="utf-8"><title>{title}</title></head>
  <body>
    <h2>{heading}</h2>
    <form action="/view" method="get">
      {work_label}: <input name="work" required>
      {page_label}: <input name="page" value="0" style="width:3em">
      <button>{submit}</button>
    </form>
  </body>
</html>
"#,
        lang = s.lang,
        title = s.index_title,
        heading = s.index_heading,
        work_label = s.work_label,
        page_label = s.page_label,
        submit = s.submit,
    )
}

/// View page for an animated work: the GIF plus a download link.
pub fn animated_page(locale: Locale, work: &WorkId) -> String {
    let s = locale.strings();
    let src = animated_src(work);
    format!(
        r#"<!doctype html>
<html lang="{lang}">
  <head><meta charset="utf-8"><title>{title} {work}</title></head>
  <body style="margin:0;background:#000;text-align:center">
    <img src="{src}" style="max-width:100%;height:auto" alt="Ugoira {work}">
    <p>
      <a href="{src}" download="{work}.gif"
         style="display:inline-block;margin:10px;padding:10px;background:#fff;color:#000;text-decoration:none;border-radius:4px;">
        {download}
      </a>
    </p>
  </body>
</html>
"#,
        lang = s.lang,
        title = s.animated_title,
        download = s.download_gif,
    )
}

/// View page for one page of a still work.
pub fn still_page(locale: Locale, work: &WorkId, page: PageIndex) -> String {
    let s = locale.strings();
    let src = still_src(work, page);
    format!(
        r#"<!doctype html>
<html lang="{lang}">
  <head><meta charset="utf-8"><title>Pixiv {work} p{page}</title></head>
  <body style="margin:0;background:#000;text-align:center">
    <img src="{src}" style="max-width:100%;height:auto" alt="Pixiv {work} p{page}">
  </body>
</html>
"#,
        lang = s.lang,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/server/html.rs"]
mod tests;
