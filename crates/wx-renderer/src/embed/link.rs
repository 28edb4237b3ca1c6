//! Parsing of `![[...]]` targets.

use wx_images::mime::is_webp;

const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".gif", ".bmp"];

/// `![[name.png|W]]` or `![[name.png|WxH]]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ImageLink<'a> {
    pub(crate) path: &'a str,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
}

/// `![[drawing.svg|center|200x100]]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SvgLink<'a> {
    pub(crate) filename: &'a str,
    pub(crate) class: &'static str,
    pub(crate) style: String,
}

/// `![[Note#Heading]]` or `![[Note#^block]]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NoteLink<'a> {
    pub(crate) path: &'a str,
    pub(crate) heading: Option<&'a str>,
    pub(crate) block: Option<&'a str>,
}

/// What an embed target points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum EmbedTarget<'a> {
    Image(ImageLink<'a>),
    Svg(SvgLink<'a>),
    Note(NoteLink<'a>),
}

impl<'a> EmbedTarget<'a> {
    pub(crate) fn parse(link: &'a str) -> Self {
        let lower = link.to_ascii_lowercase();
        if let Some(image) = parse_image_link(link) {
            Self::Image(image)
        } else if lower.ends_with(".svg") || lower.contains(".svg|") {
            Self::Svg(parse_svg_link(link))
        } else {
            Self::Note(parse_note_link(link))
        }
    }
}

fn is_image(path: &str) -> bool {
    let lower = path.to_lowercase();
    is_webp(&lower) || IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Leading decimal digits of `s`, the way a lenient integer parse reads them.
fn leading_number(s: &str) -> Option<u32> {
    let digits: &str = &s[..s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len())];
    digits.parse().ok()
}

fn parse_image_link(link: &str) -> Option<ImageLink<'_>> {
    let mut parts = link.split('|');
    let path = parts.next().unwrap_or_default();
    if !is_image(path) {
        return None;
    }

    let size = parts.next();
    let (width, height) = match (size, parts.next()) {
        (Some(size), None) => {
            let size = size.trim().to_lowercase();
            let mut dims = size.split('x');
            let width = dims.next().and_then(leading_number);
            let height = dims.next().and_then(leading_number);
            (width, height)
        }
        _ => (None, None),
    };

    Some(ImageLink {
        path,
        width,
        height,
    })
}

fn position_class(position: &str) -> Option<&'static str> {
    match position {
        "left" => Some("note-embed-svg-left"),
        "center" => Some("note-embed-svg-center"),
        "right" => Some("note-embed-svg-right"),
        _ => None,
    }
}

fn parse_svg_link(link: &str) -> SvgLink<'_> {
    let parts: Vec<&str> = link.split('|').collect();
    let filename = parts[0];
    let mut class = "note-embed-svg-left";
    let mut size = "";

    match &parts[1..] {
        [modifier] => match position_class(modifier) {
            Some(position) => class = position,
            None => size = *modifier,
        },
        [first, second] => {
            if let Some(position) = position_class(first) {
                class = position;
                size = *second;
            } else {
                size = *first;
                class = position_class(second).unwrap_or(class);
            }
        }
        _ => {}
    }

    let style = if size.is_empty() {
        r#"style="width:100%;height:100%""#.to_owned()
    } else {
        match size.split_once('x') {
            Some((width, height)) => format!(r#"style="width:{width}px;height:{height}px;""#),
            None => format!(r#"style="width:{size}px;""#),
        }
    };

    SvgLink {
        filename,
        class,
        style,
    }
}

fn parse_note_link(link: &str) -> NoteLink<'_> {
    let target = link.split('|').next().unwrap_or_default();
    let mut items = target.split('#');
    let path = items.next().unwrap_or_default();

    let (heading, block) = match (items.next(), items.next()) {
        (Some(anchor), None) if anchor.starts_with('^') => (None, Some(anchor)),
        (Some(anchor), None) => (Some(anchor), None),
        _ => (None, None),
    };

    NoteLink {
        path,
        heading,
        block,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_image_links() {
        assert_eq!(
            EmbedTarget::parse("pic.PNG"),
            EmbedTarget::Image(ImageLink {
                path: "pic.PNG",
                width: None,
                height: None
            })
        );
        assert_eq!(
            EmbedTarget::parse("a/pic.webp|300"),
            EmbedTarget::Image(ImageLink {
                path: "a/pic.webp",
                width: Some(300),
                height: None
            })
        );
        assert_eq!(
            EmbedTarget::parse("pic.jpg|300x200"),
            EmbedTarget::Image(ImageLink {
                path: "pic.jpg",
                width: Some(300),
                height: Some(200)
            })
        );
    }

    #[test]
    fn test_svg_links() {
        let EmbedTarget::Svg(svg) = EmbedTarget::parse("d.svg") else {
            panic!("expected svg");
        };
        assert_eq!(svg.class, "note-embed-svg-left");
        assert_eq!(svg.style, r#"style="width:100%;height:100%""#);

        let EmbedTarget::Svg(svg) = EmbedTarget::parse("d.svg|center|200x100") else {
            panic!("expected svg");
        };
        assert_eq!(svg.filename, "d.svg");
        assert_eq!(svg.class, "note-embed-svg-center");
        assert_eq!(svg.style, r#"style="width:200px;height:100px;""#);

        let EmbedTarget::Svg(svg) = EmbedTarget::parse("d.svg|150|right") else {
            panic!("expected svg");
        };
        assert_eq!(svg.class, "note-embed-svg-right");
        assert_eq!(svg.style, r#"style="width:150px;""#);

        let EmbedTarget::Svg(svg) = EmbedTarget::parse("Drawing.SVG|center") else {
            panic!("expected svg");
        };
        assert_eq!(svg.filename, "Drawing.SVG");
        assert_eq!(svg.class, "note-embed-svg-center");
        assert!(matches!(EmbedTarget::parse("Logo.Svg"), EmbedTarget::Svg(_)));
    }

    #[test]
    fn test_note_links() {
        assert_eq!(
            EmbedTarget::parse("Note#Section"),
            EmbedTarget::Note(NoteLink {
                path: "Note",
                heading: Some("Section"),
                block: None
            })
        );
        assert_eq!(
            EmbedTarget::parse("#^abc|alias"),
            EmbedTarget::Note(NoteLink {
                path: "",
                heading: None,
                block: Some("^abc")
            })
        );
    }
}
