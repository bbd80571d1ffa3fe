//! Embed-code generation
//!
//! Produces the fixed before/after toggle widget. Only data is substituted:
//! the record id, dimensions, image URLs, the accent color (first palette
//! entry) and the typeface (first font).

use crate::embed::model::Embed;

/// Accent used when the palette is empty
pub const DEFAULT_ACCENT_COLOR: &str = "#3b82f6";

/// Typeface used when the font list is empty
pub const DEFAULT_FONT_STACK: &str = "Arial, sans-serif";

const TEMPLATE: &str = r#"<!-- Before/After Embed -->
<div id="before-after-embed-__ID__" style="width: __WIDTH__px; max-width: 100%; margin: 0 auto; font-family: __FONT__;"></div>
<script>
(function() {
  var container = document.getElementById('before-after-embed-__ID__');
  var beforeSrc = __BEFORE_JS__;
  var afterSrc = __AFTER_JS__;

  var styles = '.ba-container { position: relative; width: 100%; height: __HEIGHT__px; overflow: hidden; border-radius: 8px; box-shadow: 0 4px 6px rgba(0,0,0,0.1); }'
    + '.ba-image { position: absolute; top: 0; left: 0; width: 100%; height: 100%; object-fit: cover; }'
    + '.ba-toggle { position: absolute; bottom: 20px; left: 50%; transform: translateX(-50%); z-index: 10; background: __ACCENT__; color: white; border: none; padding: 12px 24px; border-radius: 24px; cursor: pointer; font-size: 14px; font-weight: 600; box-shadow: 0 2px 8px rgba(0,0,0,0.2); transition: all 0.3s; }'
    + '.ba-toggle:hover { transform: translateX(-50%) translateY(-2px); box-shadow: 0 4px 12px rgba(0,0,0,0.3); }'
    + '.ba-label { position: absolute; top: 20px; background: rgba(0,0,0,0.7); color: white; padding: 8px 16px; border-radius: 4px; font-size: 12px; font-weight: 600; }'
    + '.ba-label.before { left: 20px; }'
    + '.ba-label.after { right: 20px; }';

  var styleSheet = document.createElement('style');
  styleSheet.textContent = styles;
  document.head.appendChild(styleSheet);

  container.innerHTML = '<div class="ba-container">'
    + '<img class="ba-image" src="__BEFORE_ATTR__" alt="Before" id="ba-img-__ID__">'
    + '<div class="ba-label before" id="ba-label-__ID__">BEFORE</div>'
    + '<button class="ba-toggle" id="ba-btn-__ID__">Show After</button>'
    + '</div>';

  var showingAfter = false;
  var img = document.getElementById('ba-img-__ID__');
  var btn = document.getElementById('ba-btn-__ID__');
  var label = document.getElementById('ba-label-__ID__');

  btn.addEventListener('click', function() {
    showingAfter = !showingAfter;
    img.src = showingAfter ? afterSrc : beforeSrc;
    btn.textContent = showingAfter ? 'Show Before' : 'Show After';
    label.textContent = showingAfter ? 'AFTER' : 'BEFORE';
    label.className = showingAfter ? 'ba-label after' : 'ba-label before';
  });
})();
</script>"#;

/// Keep only characters that cannot break out of a CSS value, an HTML
/// attribute or a single-quoted JS string
fn css_safe(value: &str, extra: &[char]) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '.') || extra.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Accent color: first palette entry, or the default
pub fn accent_color(embed: &Embed) -> String {
    embed
        .colors
        .first()
        .map(|c| css_safe(c, &['#', '(', ')', ',', '%']))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_ACCENT_COLOR.to_string())
}

/// Typeface: first font, or the default stack
pub fn font_family(embed: &Embed) -> String {
    embed
        .fonts
        .first()
        .map(|f| css_safe(f, &[',']))
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FONT_STACK.to_string())
}

/// A JS string literal that cannot close the surrounding `<script>` element
fn js_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
}

/// Render the embeddable widget for `embed`
pub fn generate_embed_code(embed: &Embed) -> String {
    TEMPLATE
        .replace("__ID__", &embed.id.to_string())
        .replace("__WIDTH__", &embed.width.to_string())
        .replace("__HEIGHT__", &embed.height.to_string())
        .replace("__FONT__", &font_family(embed))
        .replace("__ACCENT__", &accent_color(embed))
        .replace("__BEFORE_JS__", &js_string(&embed.before_image_url))
        .replace("__AFTER_JS__", &js_string(&embed.after_image_url))
        .replace(
            "__BEFORE_ATTR__",
            &htmlescape::encode_attribute(&embed.before_image_url),
        )
}
