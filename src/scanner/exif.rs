use chrono::NaiveDateTime;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// 写真から読み取った撮影情報
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifData {
    pub captured: Option<NaiveDateTime>,
    pub camera_model: Option<String>,
    pub lens_model: Option<String>,
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
    pub iso: Option<String>,
}

pub fn read_exif(path: &Path) -> Result<ExifData, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut bufreader = BufReader::new(file);
    let exif_reader = exif::Reader::new();
    let exif = exif_reader.read_from_container(&mut bufreader)?;

    let text = |tag: exif::Tag| -> Option<String> {
        exif.get_field(tag, exif::In::PRIMARY)
            .map(|field| clean_value(&field.display_value().to_string()))
            .filter(|s| !s.is_empty())
    };
    let with_unit = |tag: exif::Tag| -> Option<String> {
        exif.get_field(tag, exif::In::PRIMARY)
            .map(|field| clean_value(&field.display_value().with_unit(&exif).to_string()))
            .filter(|s| !s.is_empty())
    };

    // DateTimeOriginal を優先、なければ DateTime
    let captured = text(exif::Tag::DateTimeOriginal)
        .or_else(|| text(exif::Tag::DateTime))
        .and_then(|s| parse_exif_datetime(&s));

    Ok(ExifData {
        captured,
        camera_model: text(exif::Tag::Model),
        lens_model: text(exif::Tag::LensModel),
        aperture: with_unit(exif::Tag::FNumber),
        shutter_speed: with_unit(exif::Tag::ExposureTime),
        iso: text(exif::Tag::PhotographicSensitivity),
    })
}

/// ASCII値の引用符と余分な空白を除く
fn clean_value(value: &str) -> String {
    value.trim().trim_matches('"').trim().to_string()
}

/// `2024-06-01 12:00:00` または生の `2024:06:01 12:00:00`
pub fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y:%m:%d %H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exif_datetime() {
        let a = parse_exif_datetime("2024-06-01 12:30:00").expect("パース失敗");
        let b = parse_exif_datetime("2024:06:01 12:30:00").expect("パース失敗");
        assert_eq!(a, b);
        assert!(parse_exif_datetime("yesterday").is_none());
    }

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value("\"X100V\" "), "X100V");
        assert_eq!(clean_value("\"\""), "");
    }

    #[test]
    fn test_read_exif_not_an_image() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("fake.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();
        assert!(read_exif(&path).is_err());
    }
}
