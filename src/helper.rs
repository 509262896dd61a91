use core::fmt;
use core::str::FromStr;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, RgbaImage};

use crate::error::QrError;
use crate::qrcode::QrCode;

/*---- Colors and options ----*/

/// An RGBA color as parsed from a hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: u8,
}

impl Rgba {
	pub const BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 255 };
	pub const WHITE: Rgba = Rgba { r: 255, g: 255, b: 255, a: 255 };

	/// Parses `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`. The leading `#` is optional and
	/// alpha defaults to opaque.
	pub fn from_hex(hex: &str) -> Result<Rgba, QrError> {
		let invalid = || QrError::InvalidColor(hex.to_string());
		let digits: Vec<char> = hex.trim_start_matches('#').chars().collect();

		let expanded: Vec<char> = match digits.len() {
			3 | 4 => digits.iter().flat_map(|&c| [c, c]).collect(),
			6 | 8 => digits,
			_ => return Err(invalid()),
		};
		let mut value: String = expanded.into_iter().collect();
		if value.len() == 6 {
			value.push_str("FF");
		}

		let channel = |i: usize| -> Result<u8, QrError> {
			value
				.get(i * 2..i * 2 + 2)
				.and_then(|pair| u8::from_str_radix(pair, 16).ok())
				.ok_or_else(invalid)
		};
		Ok(Rgba {
			r: channel(0)?,
			g: channel(1)?,
			b: channel(2)?,
			a: channel(3)?,
		})
	}

	/// `#rrggbb` in lowercase, without alpha.
	pub fn hex(&self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}

	fn to_pixel(self) -> image::Rgba<u8> {
		image::Rgba([self.r, self.g, self.b, self.a])
	}
}

impl FromStr for Rgba {
	type Err = QrError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Rgba::from_hex(s)
	}
}

impl fmt::Display for Rgba {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{:02x}", self.hex(), self.a)
	}
}

/// Layout and palette shared by the renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererOptions {
	/// Quiet zone width in modules.
	pub margin: usize,
	/// Pixels per module, used when `width` is unset or too small.
	pub scale: f64,
	/// Requested image width in pixels.
	pub width: Option<u32>,
	pub dark: Rgba,
	pub light: Rgba,
}

impl Default for RendererOptions {
	fn default() -> Self {
		RendererOptions {
			margin: 4,
			scale: 4.0,
			width: None,
			dark: Rgba::BLACK,
			light: Rgba::WHITE,
		}
	}
}

impl RendererOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Negative margins select the default of 4.
	pub fn with_margin(mut self, margin: i32) -> Self {
		self.margin = usize::try_from(margin).unwrap_or(4);
		self
	}

	pub fn with_scale(mut self, scale: f64) -> Self {
		self.scale = scale;
		self
	}

	/// Widths below 21 pixels are ignored. Setting a width resets the scale to 4.
	pub fn with_width(mut self, width: u32) -> Self {
		if width >= 21 {
			self.width = Some(width);
			self.scale = 4.0;
		} else {
			self.width = None;
		}
		self
	}

	pub fn with_dark(mut self, hex: &str) -> Result<Self, QrError> {
		self.dark = Rgba::from_hex(hex)?;
		Ok(self)
	}

	pub fn with_light(mut self, hex: &str) -> Result<Self, QrError> {
		self.light = Rgba::from_hex(hex)?;
		Ok(self)
	}

	/// Pixels per module for a symbol of `qr_size` modules.
	pub fn scale_for(&self, qr_size: usize) -> f64 {
		let modules = (qr_size + self.margin * 2) as f64;
		match self.width {
			Some(width) if f64::from(width) >= modules => f64::from(width) / modules,
			_ => self.scale,
		}
	}

	/// Side length in pixels of the rendered image.
	pub fn image_width(&self, qr_size: usize) -> u32 {
		((qr_size + self.margin * 2) as f64 * self.scale_for(qr_size)).floor() as u32
	}
}

/*---- Text renderers ----*/

/// Renders the symbol with Unicode half blocks, two module rows per text line.
///
/// `margin / 2` blank lines go above and below and `margin` blank columns either side.
/// The block set is inverted when the dark color is white or the light color is black.
///
/// # Example
///
/// ```rust
/// use qrkit::{helper::{to_utf8_string, RendererOptions}, QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low).unwrap();
/// println!("{}", to_utf8_string(&qr, &RendererOptions::default()));
/// ```
pub fn to_utf8_string(qr: &QrCode, opts: &RendererOptions) -> String {
	let inverted = opts.dark.hex() == "#ffffff" || opts.light.hex() == "#000000";
	// indexed by (top dark, bottom dark)
	let blocks: [[&str; 2]; 2] = if inverted {
		[["█", "▀"], ["▄", " "]]
	} else {
		[[" ", "▄"], ["▀", "█"]]
	};
	let light = blocks[0][0];

	let size = qr.size() as i32;
	let line_width = qr.size() + opts.margin * 2;
	let h_margin = format!("{}\n", light.repeat(line_width)).repeat(opts.margin / 2);
	let v_margin = light.repeat(opts.margin);

	let mut output = String::new();
	output += &h_margin;
	for y in (0..size).step_by(2) {
		output += &v_margin;
		for x in 0..size {
			let top = qr.get_module(x, y);
			let bottom = qr.get_module(x, y + 1);
			output += blocks[usize::from(top)][usize::from(bottom)];
		}
		output += &v_margin;
		output += "\n";
	}
	output += &h_margin;
	output.pop();
	output
}

/// Renders the symbol with ANSI background colors, two spaces per module, inside a
/// one-module white border.
pub fn to_terminal_string(qr: &QrCode) -> String {
	const BLACK: &str = "\x1b[40m  \x1b[0m";
	const WHITE: &str = "\x1b[47m  \x1b[0m";

	let size = qr.size() as i32;
	let h_margin = WHITE.repeat(qr.size() + 2);

	let mut output = format!("{}\n", h_margin);
	for y in 0..size {
		output += WHITE;
		for x in 0..size {
			output += if qr.get_module(x, y) { BLACK } else { WHITE };
		}
		output += WHITE;
		output += "\n";
	}
	output += &h_margin;
	output += "\n";
	output
}

/// Renders the symbol with half blocks and ANSI colors, two module rows per line,
/// inside a one-module border.
///
/// `inverse` swaps the foreground and background colors.
pub fn to_terminal_small_string(qr: &QrCode, inverse: bool) -> String {
	const BG_WHITE: &str = "\x1b[47m";
	const BG_BLACK: &str = "\x1b[40m";
	const FG_WHITE: &str = "\x1b[37m";
	const FG_BLACK: &str = "\x1b[30m";
	const RESET: &str = "\x1b[0m";

	let line_setup = if inverse {
		format!("{}{}", BG_BLACK, FG_WHITE)
	} else {
		format!("{}{}", BG_WHITE, FG_BLACK)
	};
	let (white, black) = if inverse { (FG_BLACK, FG_WHITE) } else { (FG_WHITE, FG_BLACK) };

	// 0 outside, 1 light or border, 2 dark
	let size = qr.size() as i32;
	let pixel = |x: i32, y: i32| -> u8 {
		if x > size || y > size || x < -1 || y < -1 {
			0
		} else if x == size || y == size || x == -1 || y == -1 || !qr.get_module(x, y) {
			1
		} else {
			2
		}
	};
	let cell = |top: u8, bottom: u8| -> String {
		match (top, bottom) {
			(0, 0) => format!("{} {}", RESET, line_setup),
			(0, 1) => format!("{}{}▄{}", RESET, white, line_setup),
			(0, _) => format!("{}{}▄{}", RESET, black, line_setup),
			(1, 0) => format!("{}{}▀{}", RESET, white, line_setup),
			(1, 1) => " ".to_string(),
			(1, _) => "▄".to_string(),
			(_, 0) => format!("{}{}▀{}", RESET, black, line_setup),
			(_, 1) => "▀".to_string(),
			_ => "█".to_string(),
		}
	};

	let new_line = format!("{}\n{}", RESET, line_setup);
	let mut output = line_setup.clone();
	for y in (-1..size + 1).step_by(2) {
		for x in -1..=size {
			output += &cell(pixel(x, y), pixel(x, y + 1));
		}
		output += &new_line;
	}
	output += RESET;
	output
}

/*---- SVG ----*/

fn color_attrib(color: Rgba, attrib: &str) -> String {
	let alpha = f64::from(color.a) / 255.0;
	let attr = format!("{}=\"{}\"", attrib, color.hex());
	if alpha < 1.0 {
		let opacity = format!("{:.2}", alpha);
		format!("{} {}-opacity=\"{}\"", attr, attrib, &opacity[1..])
	} else {
		attr
	}
}

/// Path data drawing each horizontal run of dark modules as one stroke through the
/// middle of its row.
fn qr_to_path(qr: &QrCode, margin: usize) -> String {
	let size = qr.size();
	let data = qr.modules().data();
	let mut path = String::new();
	let mut move_by = 0;
	let mut new_row = false;
	let mut line_length = 0;

	for (i, &dark) in data.iter().enumerate() {
		let col = i % size;
		let row = i / size;
		if col == 0 {
			new_row = true;
		}
		if !dark {
			move_by += 1;
			continue;
		}

		line_length += 1;
		if col == 0 || !data[i - 1] {
			if new_row {
				path += &format!("M{} {}", col + margin, 0.5 + (row + margin) as f64);
			} else {
				path += &format!("m{} 0", move_by);
			}
			move_by = 0;
			new_row = false;
		}
		if col + 1 >= size || !data[i + 1] {
			path += &format!("h{}", line_length);
			line_length = 0;
		}
	}
	path
}

/// Returns a string of SVG code for an image depicting the given QR Code.
///
/// The light background is omitted when its alpha is zero. The string always uses
/// Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(qr: &QrCode, opts: &RendererOptions) -> String {
	let qr_size = qr.size() + opts.margin * 2;

	let background = if opts.light.a == 0 {
		String::new()
	} else {
		format!(
			"<path {} d=\"M0 0h{1}v{1}H0z\"/>",
			color_attrib(opts.light, "fill"),
			qr_size
		)
	};
	let path = format!(
		"<path {} d=\"{}\"/>",
		color_attrib(opts.dark, "stroke"),
		qr_to_path(qr, opts.margin)
	);
	let width = match opts.width {
		Some(w) => format!("width=\"{0}\" height=\"{0}\" ", w),
		None => String::new(),
	};

	format!(
		"<svg xmlns=\"http://www.w3.org/2000/svg\" {0}viewBox=\"0 0 {1} {1}\" shape-rendering=\"crispEdges\">{2}{3}</svg>\n",
		width, qr_size, background, path
	)
}

/*---- Raster ----*/

/// Converts a QR Code into an RGBA image.
///
/// Each module becomes a `scale`-sized square (see [`RendererOptions::scale_for`]) and
/// the quiet zone is painted with the light color.
///
/// # Example
///
/// ```rust
/// use qrkit::{helper::{to_image_buffer, RendererOptions}, QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low).unwrap();
/// let img = to_image_buffer(&qr, &RendererOptions::default());
/// assert_eq!(img.width(), (qr.size() as u32 + 8) * 4);
/// ```
pub fn to_image_buffer(qr: &QrCode, opts: &RendererOptions) -> RgbaImage {
	let size = qr.size();
	let scale = opts.scale_for(size);
	let img_size = opts.image_width(size);
	let scaled_margin = opts.margin as f64 * scale;
	let far_edge = f64::from(img_size) - scaled_margin;
	let (dark, light) = (opts.dark.to_pixel(), opts.light.to_pixel());

	RgbaImage::from_fn(img_size, img_size, |px, py| {
		let (x, y) = (f64::from(px), f64::from(py));
		if x < scaled_margin || y < scaled_margin || x >= far_edge || y >= far_edge {
			return light;
		}
		let col = ((x - scaled_margin) / scale).floor() as i32;
		let row = ((y - scaled_margin) / scale).floor() as i32;
		if qr.get_module(col, row) {
			dark
		} else {
			light
		}
	})
}

/// Encodes the rendered image as PNG.
pub fn to_png_bytes(qr: &QrCode, opts: &RendererOptions) -> Result<Vec<u8>, QrError> {
	let img = to_image_buffer(qr, opts);
	let mut bytes: Vec<u8> = Vec::new();
	img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
	Ok(bytes)
}

/// Returns the PNG as a `data:image/png;base64,` URL.
pub fn to_data_url(qr: &QrCode, opts: &RendererOptions) -> Result<String, QrError> {
	let bytes = to_png_bytes(qr, opts)?;
	Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}

/// Renders a QR Code to a PNG file, creating parent directories as needed.
///
/// # Arguments
///
/// * `qr` - The QR Code to render.
/// * `path` - Destination file.
/// * `opts` - Layout and palette.
///
/// # Errors
///
/// Returns [`QrError::Io`] if the directory cannot be created and [`QrError::Image`]
/// if the image cannot be written.
///
/// # Example
///
/// ```no_run
/// use qrkit::{helper::{save_png, RendererOptions}, QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low).unwrap();
/// save_png(&qr, "generated/qr_code.png", &RendererOptions::default()).unwrap();
/// ```
pub fn save_png(qr: &QrCode, path: impl AsRef<Path>, opts: &RendererOptions) -> Result<(), QrError> {
	let path = path.as_ref();
	if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
		fs::create_dir_all(dir)?;
	}
	to_image_buffer(qr, opts).save_with_format(path, ImageFormat::Png)?;
	Ok(())
}

// Tests
#[cfg(test)]
mod tests {
	use super::*;
	use crate::error_correction::QrCodeEcc;

	fn sample() -> QrCode {
		QrCode::encode_text("HELLO WORLD", QrCodeEcc::Low).unwrap()
	}

	#[test]
	fn test_rgba_from_hex() {
		assert_eq!(Rgba::from_hex("#fff").unwrap(), Rgba::WHITE);
		assert_eq!(Rgba::from_hex("#0008").unwrap(), Rgba { r: 0, g: 0, b: 0, a: 0x88 });
		let c: Rgba = "123456".parse().unwrap();
		assert_eq!(c, Rgba { r: 0x12, g: 0x34, b: 0x56, a: 255 });
		assert_eq!(c.hex(), "#123456");
		assert_eq!(c.to_string(), "#123456ff");
		assert_eq!(Rgba::from_hex("#AbCdEf80").unwrap().hex(), "#abcdef");

		for bad in ["", "#12", "#12345", "#123456789", "#ggg", "#12345é"] {
			assert!(matches!(Rgba::from_hex(bad), Err(QrError::InvalidColor(_))), "{}", bad);
		}
	}

	#[test]
	fn test_renderer_options() {
		let opts = RendererOptions::new().with_margin(-1).with_scale(8.0).with_width(10);
		assert_eq!(opts.margin, 4);
		assert_eq!(opts.width, None);
		assert_eq!(opts.scale, 8.0);

		let opts = RendererOptions::new().with_scale(8.0).with_width(290);
		assert_eq!(opts.scale, 4.0);
		assert_eq!(opts.scale_for(21), 10.0);
		assert_eq!(opts.image_width(21), 290);
		assert_eq!(opts.scale_for(177), 290.0 / 185.0);

		// too narrow for the symbol, so the scale wins
		let narrow = RendererOptions::new().with_width(100);
		assert_eq!(narrow.scale_for(177), 4.0);
		assert_eq!(narrow.image_width(177), 740);

		assert!(RendererOptions::new().with_dark("nope").is_err());
	}

	#[test]
	fn test_utf8_layout() {
		let qr = sample();
		let opts = RendererOptions::new().with_margin(0);
		let out = to_utf8_string(&qr, &opts);
		let lines: Vec<&str> = out.split('\n').collect();
		assert_eq!(lines.len(), 11);
		assert!(lines.iter().all(|l| l.chars().count() == 21));
		// finder rows 0 and 1
		assert!(lines[0].starts_with("█▀▀▀▀▀█"));
		// last line only has the top half
		assert!(!lines[10].contains('▄'));
		assert!(!out.ends_with('\n'));
	}

	#[test]
	fn test_utf8_inverted_palette() {
		let qr = sample();
		let opts = RendererOptions::new().with_dark("#fff").unwrap().with_light("#000").unwrap();
		let out = to_utf8_string(&qr, &opts);
		let first = out.lines().next().unwrap();
		assert_eq!(first, "█".repeat(29));
		let finder_row = out.lines().nth(2).unwrap();
		assert!(finder_row.starts_with("████ ▄▄▄▄▄ "));
	}

	#[test]
	fn test_terminal_string() {
		let qr = sample();
		let out = to_terminal_string(&qr);
		let white = "\x1b[47m  \x1b[0m";
		let black = "\x1b[40m  \x1b[0m";
		let lines: Vec<&str> = out.split('\n').collect();
		assert_eq!(lines.len(), 21 + 3);
		assert_eq!(lines[0], white.repeat(23));
		assert!(lines[1].starts_with(&format!("{}{}", white, black.repeat(7))));
		assert_eq!(lines[23], "");
	}

	#[test]
	fn test_terminal_small_string() {
		let qr = sample();
		let out = to_terminal_small_string(&qr, false);
		let setup = "\x1b[47m\x1b[30m";
		let lines: Vec<&str> = out.split('\n').collect();
		assert_eq!(lines.len(), 12 + 1);
		// border row above finder row 0
		assert!(lines[0].starts_with(&format!("{} {}", setup, "▄".repeat(7))));
		// last line pairs row 20 with the border row below
		assert!(lines[11].starts_with(&format!("{}\x1b[0m\x1b[37m▀", setup)));
		assert_eq!(lines[12], format!("{}\x1b[0m", setup));

		let inverse = to_terminal_small_string(&qr, true);
		assert!(inverse.starts_with("\x1b[40m\x1b[37m ▄▄▄▄▄▄▄"));
		assert_eq!(inverse.matches('\n').count(), 12);
	}

	#[test]
	fn test_svg_string() {
		let qr = sample();
		let svg = to_svg_string(&qr, &RendererOptions::default());
		assert!(svg.starts_with(
			"<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 29 29\" shape-rendering=\"crispEdges\">\
			 <path fill=\"#ffffff\" d=\"M0 0h29v29H0z\"/><path stroke=\"#000000\" d=\"M4 4.5h7m"
		));
		assert!(svg.ends_with("\"/></svg>\n"));

		let opts = RendererOptions::new()
			.with_width(200)
			.with_dark("#00000080")
			.unwrap()
			.with_light("#ffffff00")
			.unwrap();
		let svg = to_svg_string(&qr, &opts);
		assert!(svg.contains("width=\"200\" height=\"200\" viewBox"));
		assert!(svg.contains("stroke=\"#000000\" stroke-opacity=\".50\""));
		assert!(!svg.contains("fill="));
	}

	#[test]
	fn test_svg_path_runs() {
		let qr = sample();
		let path = qr_to_path(&qr, 0);
		// second finder row: 1000001 on both sides
		assert!(path.contains("M0 1.5h1m5 0h1"));
		let drawn: usize = path
			.split(|c: char| c == 'M' || c == 'm')
			.filter_map(|cmd| cmd.split('h').nth(1))
			.map(|len| len.parse::<usize>().unwrap())
			.sum();
		assert_eq!(drawn, qr.modules().dark_count());
	}

	#[test]
	fn test_image_buffer() {
		let qr = sample();
		let img = to_image_buffer(&qr, &RendererOptions::default());
		assert_eq!(img.dimensions(), (116, 116));
		assert_eq!(img.get_pixel(0, 0), &image::Rgba([255, 255, 255, 255]));
		assert_eq!(img.get_pixel(16, 16), &image::Rgba([0, 0, 0, 255]));
		assert_eq!(img.get_pixel(19, 19), &image::Rgba([0, 0, 0, 255]));
		// second finder ring is light
		assert_eq!(img.get_pixel(20, 20), &image::Rgba([255, 255, 255, 255]));
		assert_eq!(img.get_pixel(115, 115), &image::Rgba([255, 255, 255, 255]));
	}

	#[test]
	fn test_png_and_data_url() {
		let qr = sample();
		let opts = RendererOptions::default();
		let bytes = to_png_bytes(&qr, &opts).unwrap();
		assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
		let url = to_data_url(&qr, &opts).unwrap();
		assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
	}

	#[test]
	fn test_save_png_creates_directories() {
		let dir = std::env::temp_dir().join(format!("qrkit-save-{}", std::process::id()));
		let path = dir.join("nested").join("qr.png");
		save_png(&sample(), &path, &RendererOptions::default()).unwrap();
		let img = image::open(&path).unwrap();
		assert_eq!(img.width(), 116);
		fs::remove_dir_all(&dir).unwrap();
	}
}
