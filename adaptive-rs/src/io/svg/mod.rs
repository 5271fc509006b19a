mod recorder;
mod svg_util;
mod toolpath_to_svg;

#[doc(inline)]
pub use recorder::SvgRecorder;
#[doc(inline)]
pub use svg_util::Color;
#[doc(inline)]
pub use svg_util::SvgDrawOptions;
#[doc(inline)]
pub use svg_util::SvgTheme;
#[doc(inline)]
pub use toolpath_to_svg::*;
