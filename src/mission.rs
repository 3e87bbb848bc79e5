//! Mission-specific conventions of Sentinel product names.
//!
//! Every rule that depends on the mission prefix of a filename lives in the
//! `MissionProfile` table below, so callers only ever ask a `Mission` for its
//! conventions instead of checking prefixes themselves.

use std::fmt;

use failure::Error;
use failure::Fail;

use crate::geometry::AxisOrder;

/// The Sentinel missions a product filename may belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mission {
    S1,
    S2,
    S3,
    S5,
    S6,
}

/// The on-disk layout of a product as delivered to the archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalFormat {
    Safe,
    Sen3,
    NetCdf,
}

impl LocalFormat {
    pub fn label(self) -> &'static str {
        match self {
            LocalFormat::Safe => "SAFE",
            LocalFormat::Sen3 => "SEN3",
            LocalFormat::NetCdf => "NetCDF",
        }
    }
}

/// How the product type alias is cut out of a filename.
#[derive(Clone, Copy, Debug)]
enum ProductTypeRule {
    /// Two tokens after the platform, or a fixed slice when the first of them starts with `S`.
    TokensOrSlice(usize, usize),
    /// The second underscore-delimited token.
    SecondToken,
    Slice(usize, usize),
    Unsupported,
}

/// The path component between the date and the filename in archive URLs.
#[derive(Clone, Copy, Debug)]
enum UrlExtra {
    Slice(usize, usize),
    ProductType,
    Nothing,
}

#[derive(Debug)]
struct MissionProfile {
    collection: &'static str,
    container_suffix: &'static str,
    local_format: LocalFormat,
    manifest_order: AxisOrder,
    product_type: ProductTypeRule,
    date_offset: Option<usize>,
    url_extra: UrlExtra,
}

const S1_PROFILE: MissionProfile = MissionProfile {
    collection: "Sentinel1",
    container_suffix: ".SAFE",
    local_format: LocalFormat::Safe,
    manifest_order: AxisOrder::LatLon,
    product_type: ProductTypeRule::TokensOrSlice(4, 14),
    date_offset: Some(17),
    url_extra: UrlExtra::Slice(4, 6),
};

const S2_PROFILE: MissionProfile = MissionProfile {
    collection: "Sentinel2",
    container_suffix: ".SAFE",
    local_format: LocalFormat::Safe,
    manifest_order: AxisOrder::LatLon,
    product_type: ProductTypeRule::SecondToken,
    date_offset: Some(11),
    url_extra: UrlExtra::Nothing,
};

const S3_PROFILE: MissionProfile = MissionProfile {
    collection: "Sentinel3",
    container_suffix: ".SEN3",
    local_format: LocalFormat::Sen3,
    manifest_order: AxisOrder::LatLon,
    product_type: ProductTypeRule::Slice(4, 15),
    date_offset: Some(16),
    url_extra: UrlExtra::ProductType,
};

const S5_PROFILE: MissionProfile = MissionProfile {
    collection: "Sentinel5P",
    container_suffix: ".nc",
    local_format: LocalFormat::NetCdf,
    manifest_order: AxisOrder::LonLat,
    product_type: ProductTypeRule::Slice(9, 19),
    date_offset: Some(20),
    url_extra: UrlExtra::ProductType,
};

const S6_PROFILE: MissionProfile = MissionProfile {
    collection: "Sentinel6",
    container_suffix: ".nc",
    local_format: LocalFormat::NetCdf,
    manifest_order: AxisOrder::LonLat,
    product_type: ProductTypeRule::Unsupported,
    date_offset: None,
    url_extra: UrlExtra::Nothing,
};

impl Mission {
    /// Determine the mission from the two leading characters of a product filename.
    pub fn from_filename(filename: &str) -> Result<Self, UnknownMissionError> {
        match filename.get(0..2) {
            Some("S1") => Ok(Mission::S1),
            Some("S2") => Ok(Mission::S2),
            Some("S3") => Ok(Mission::S3),
            Some("S5") => Ok(Mission::S5),
            Some("S6") => Ok(Mission::S6),
            _ => Err(UnknownMissionError::new(filename)),
        }
    }

    fn profile(self) -> &'static MissionProfile {
        match self {
            Mission::S1 => &S1_PROFILE,
            Mission::S2 => &S2_PROFILE,
            Mission::S3 => &S3_PROFILE,
            Mission::S5 => &S5_PROFILE,
            Mission::S6 => &S6_PROFILE,
        }
    }

    /// The catalogue collection name used by OpenSearch.
    pub fn collection(self) -> &'static str {
        self.profile().collection
    }

    /// The suffix of the product's archived name in the OData catalogue.
    pub fn container_suffix(self) -> &'static str {
        self.profile().container_suffix
    }

    pub fn local_format(self) -> LocalFormat {
        self.profile().local_format
    }

    /// The axis order of coordinates inside the product's own manifest.
    pub fn manifest_axis_order(self) -> AxisOrder {
        self.profile().manifest_order
    }

    /// The label used by the archive for per-mission id mapping files.
    pub fn mapping_label(self) -> &'static str {
        match self {
            Mission::S1 => "Sentinel-1",
            Mission::S2 => "Sentinel-2",
            Mission::S3 => "Sentinel-3",
            Mission::S5 => "Sentinel-5",
            Mission::S6 => "Sentinel-6",
        }
    }

    /// Derive the ESA product type alias from a filename.
    pub fn product_type_alias(self, filename: &str) -> Result<String, Error> {
        match self.profile().product_type {
            ProductTypeRule::TokensOrSlice(start, end) => {
                let tokens: Vec<&str> = filename.split('_').collect();
                if tokens.len() < 3 {
                    return Err(FilenameTooShortError::new(filename).into());
                }
                let alias = format!("{}_{}", tokens[1], tokens[2]);
                if alias.starts_with('S') {
                    Ok(slice(filename, start, end)?.to_string())
                } else {
                    Ok(alias)
                }
            }
            ProductTypeRule::SecondToken => filename
                .split('_')
                .nth(1)
                .map(str::to_string)
                .ok_or_else(|| FilenameTooShortError::new(filename).into()),
            ProductTypeRule::Slice(start, end) => Ok(slice(filename, start, end)?.to_string()),
            ProductTypeRule::Unsupported => Err(UnsupportedMissionError::new(self).into()),
        }
    }

    /// Build the direct-download URL of a product below the archive root.
    ///
    /// The path is `{platform}/{year}/{month}/{day}/{extra}/{filename}`, where `extra`
    /// is the acquisition mode for S1, missing for S2 and the product type for S3/S5.
    pub fn archive_url(self, root: &str, filename: &str, product_type: &str) -> Result<String, Error> {
        let offset = self
            .profile()
            .date_offset
            .ok_or_else(|| UnsupportedMissionError::new(self))?;
        let date = slice(filename, offset, offset + 8)?;
        if !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidAcquisitionDateError::new(filename, date).into());
        }
        let (year, month, day) = (&date[..4], &date[4..6], &date[6..]);
        let platform = platform_code(filename);

        let mut url = format!(
            "{}/{}/{}/{}/{}/",
            root.trim_end_matches('/'),
            platform,
            year,
            month,
            day
        );
        match self.profile().url_extra {
            UrlExtra::Slice(start, end) => {
                url.push_str(slice(filename, start, end)?);
                url.push('/');
            }
            UrlExtra::ProductType => {
                url.push_str(product_type);
                url.push('/');
            }
            UrlExtra::Nothing => {}
        }
        url.push_str(filename);

        Ok(url)
    }

    /// The storage format reported for a file with the given extension.
    pub fn storage_format(self, extension: &str) -> &'static str {
        match extension.to_ascii_lowercase().as_str() {
            "zip" | "safe" | "sen3" if self == Mission::S3 => LocalFormat::Sen3.label(),
            "zip" | "safe" | "sen3" if matches!(self, Mission::S1 | Mission::S2) => {
                LocalFormat::Safe.label()
            }
            "nc" => LocalFormat::NetCdf.label(),
            _ => self.local_format().label(),
        }
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.profile().collection)
    }
}

/// The platform code of a product, e.g. `S1A`.
pub fn platform_code(filename: &str) -> &str {
    filename.split('_').next().unwrap_or(filename)
}

/// The platform short name, e.g. `Sentinel-1A`.
pub fn platform_short_name(filename: &str) -> String {
    platform_code(filename).replace('S', "Sentinel-")
}

pub fn platform_long_name(filename: &str) -> String {
    if filename.starts_with("S5") {
        "Sentinel-5 precursor".to_string()
    } else {
        platform_short_name(filename)
    }
}

/// The product name without any extension, e.g. `S1A_..._4B8B` for `S1A_..._4B8B.zip`.
pub fn basename(filename: &str) -> &str {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    name.split('.').next().unwrap_or(name)
}

fn slice(filename: &str, start: usize, end: usize) -> Result<&str, FilenameTooShortError> {
    filename
        .get(start..end)
        .ok_or_else(|| FilenameTooShortError::new(filename))
}

/// This error occurs when a filename starts with no known mission prefix.
#[derive(Debug, Fail)]
#[fail(display = "Unknown filename prefix of `{}`; unable to determine collection.", filename)]
pub struct UnknownMissionError {
    filename: String,
}

impl UnknownMissionError {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
        }
    }
}

/// This error occurs when a mission has no rule for the requested naming convention.
#[derive(Debug, Fail)]
#[fail(display = "Mission {} has no product naming rule.", mission)]
pub struct UnsupportedMissionError {
    mission: Mission,
}

impl UnsupportedMissionError {
    pub fn new(mission: Mission) -> Self {
        Self { mission }
    }
}

/// This error occurs when a filename is too short for the mission's fixed offsets.
#[derive(Debug, Fail)]
#[fail(display = "Filename `{}` is too short for its mission's naming convention.", filename)]
pub struct FilenameTooShortError {
    filename: String,
}

impl FilenameTooShortError {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
        }
    }
}

/// This error occurs when the acquisition date in a filename is not `YYYYMMDD`.
#[derive(Debug, Fail)]
#[fail(display = "Filename `{}` has no acquisition date where expected: `{}`.", filename, date)]
pub struct InvalidAcquisitionDateError {
    filename: String,
    date: String,
}

impl InvalidAcquisitionDateError {
    pub fn new(filename: &str, date: &str) -> Self {
        Self {
            filename: filename.to_string(),
            date: date.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S1_NAME: &str = "S1A_IW_GRDH_1SDV_20230101T050212_20230101T050237_046583_059507_4B8B.zip";
    const S1_S4_NAME: &str = "S1C_S4_GRDH_1SDH_20250118T171404_20250118T171421_000638_000538_4B8B";
    const S2_NAME: &str = "S2A_MSIL1C_20230102T105441_N0509_R051_T32VNM_20230102T124813.zip";
    const S3_NAME: &str = "S3A_OL_1_EFR____20230103T095212_20230103T095512_20230104T141212_0179_094_036_1980_PS1_O_NT_003.zip";
    const S5_NAME: &str = "S5P_OFFL_L2__NO2____20230104T111213_20230104T125343_27153_03_020400_20230106T034417.nc";

    #[test]
    fn missions_from_prefix() {
        assert_eq!(Mission::from_filename(S1_NAME).unwrap(), Mission::S1);
        assert_eq!(Mission::from_filename(S2_NAME).unwrap(), Mission::S2);
        assert_eq!(Mission::from_filename(S3_NAME).unwrap(), Mission::S3);
        assert_eq!(Mission::from_filename(S5_NAME).unwrap(), Mission::S5);
        assert_eq!(Mission::from_filename("S6A_P4_2__LR").unwrap(), Mission::S6);
        assert!(Mission::from_filename("LC08_L1TP_198018").is_err());
        assert!(Mission::from_filename("").is_err());
    }

    #[test]
    fn collections() {
        assert_eq!(Mission::S1.collection(), "Sentinel1");
        assert_eq!(Mission::S5.collection(), "Sentinel5P");
        assert_eq!(Mission::S6.collection(), "Sentinel6");
    }

    #[test]
    fn product_type_aliases() {
        assert_eq!(Mission::S1.product_type_alias(S1_NAME).unwrap(), "IW_GRDH");
        assert_eq!(
            Mission::S1.product_type_alias(S1_S4_NAME).unwrap(),
            "S4_GRDH_1S"
        );
        assert_eq!(Mission::S2.product_type_alias(S2_NAME).unwrap(), "MSIL1C");
        assert_eq!(Mission::S3.product_type_alias(S3_NAME).unwrap(), "OL_1_EFR___");
        assert_eq!(Mission::S5.product_type_alias(S5_NAME).unwrap(), "L2__NO2___");
        assert!(Mission::S6.product_type_alias("S6A_P4_2__LR").is_err());
        assert!(Mission::S3.product_type_alias("S3A_OL").is_err());
    }

    #[test]
    fn archive_urls() {
        let root = "https://nbstds.met.no/thredds/fileServer/nbsArchive/";

        assert_eq!(
            Mission::S1.archive_url(root, S1_NAME, "IW_GRDH").unwrap(),
            format!("{}S1A/2023/01/01/IW/{}", root, S1_NAME)
        );
        assert_eq!(
            Mission::S2.archive_url(root, S2_NAME, "MSIL1C").unwrap(),
            format!("{}S2A/2023/01/02/{}", root, S2_NAME)
        );
        assert_eq!(
            Mission::S3.archive_url(root, S3_NAME, "OL_1_EFR").unwrap(),
            format!("{}S3A/2023/01/03/OL_1_EFR/{}", root, S3_NAME)
        );
        assert_eq!(
            Mission::S5.archive_url(root, S5_NAME, "L2__NO2___").unwrap(),
            format!("{}S5P/2023/01/04/L2__NO2___/{}", root, S5_NAME)
        );
        assert!(Mission::S6.archive_url(root, "S6A_P4_2__LR", "x").is_err());
    }

    #[test]
    fn archive_url_needs_a_date() {
        let root = "https://nbstds.met.no/thredds/fileServer/nbsArchive/";
        let accented = "S1A_IW_GRDH_1SDV_202\u{e9}0101T050212_20230101T050237_046583_059507_4B8B.zip";
        let lettered = "S1A_IW_GRDH_1SDV_2023O101T050212_20230101T050237_046583_059507_4B8B.zip";

        for filename in [accented, lettered] {
            let error = Mission::S1.archive_url(root, filename, "IW_GRDH").unwrap_err();
            assert!(error.downcast_ref::<InvalidAcquisitionDateError>().is_some());
        }
    }

    #[test]
    fn platform_names() {
        assert_eq!(platform_code(S1_NAME), "S1A");
        assert_eq!(platform_short_name(S1_NAME), "Sentinel-1A");
        assert_eq!(platform_long_name(S1_NAME), "Sentinel-1A");
        assert_eq!(platform_short_name(S5_NAME), "Sentinel-5P");
        assert_eq!(platform_long_name(S5_NAME), "Sentinel-5 precursor");
    }

    #[test]
    fn storage_formats() {
        assert_eq!(Mission::S1.storage_format("zip"), "SAFE");
        assert_eq!(Mission::S3.storage_format("ZIP"), "SEN3");
        assert_eq!(Mission::S5.storage_format("nc"), "NetCDF");
        assert_eq!(Mission::S2.storage_format(""), "SAFE");
    }

    #[test]
    fn basenames() {
        assert_eq!(basename("/data/S1A_IW_GRDH.zip"), "S1A_IW_GRDH");
        assert_eq!(basename("S3A_OL_1_EFR.SEN3"), "S3A_OL_1_EFR");
        assert_eq!(basename("S2A_MSIL1C"), "S2A_MSIL1C");
    }
}
