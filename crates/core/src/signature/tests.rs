use pretty_assertions::assert_eq;

use super::*;

fn tokens(list: &[&str]) -> Vec<String> {
	list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn strip_comments_removes_closed_spans() {
	assert_eq!(strip_comments("Hello/* there */world"), "Helloworld");
	assert_eq!(strip_comments("a/*1*/b/*2*/c"), "abc");
}

#[test]
fn strip_comments_drops_unterminated_tail() {
	assert_eq!(strip_comments("int f(int a /* width"), "int f(int a ");
}

#[test]
fn normalize_collapses_whitespace_and_noise() {
	let sig = normalize("int\r\n  main(\tint argc,\n\t\tchar **argv) {", &[]);
	assert_eq!(sig, "int main( int argc, char **argv)");
}

#[test]
fn normalize_removes_every_trim_token_occurrence() {
	let sig = normalize("static inline int add(int a)", &tokens(&["static", "inline"]));
	assert_eq!(sig, "int add(int a)");
}

#[test]
fn normalize_trim_tokens_are_case_sensitive() {
	let sig = normalize("STATIC int add()", &tokens(&["static"]));
	assert_eq!(sig, "STATIC int add()");
}

#[test]
fn normalize_ignores_empty_trim_token() {
	assert_eq!(normalize("f(x)", &tokens(&[""])), "f(x)");
}

#[test]
fn parse_takes_word_after_last_separator() {
	let parsed = parse("void Widget::resize(int w, int h)").unwrap();
	assert_eq!(parsed.name, "resize");
	assert_eq!(parsed.name_and_args, "resize(int w, int h)");
}

#[test]
fn parse_strips_pointer_and_reference_sigils() {
	assert_eq!(parse("char *dup(const char *s)").unwrap().name, "dup");
	assert_eq!(parse("Foo &get()").unwrap().name, "get");
	assert_eq!(parse("Block ^make()").unwrap().name, "make");
}

#[test]
fn parse_tolerates_space_before_parenthesis() {
	let parsed = parse("func beta ()").unwrap();
	assert_eq!(parsed.name, "beta");
	assert_eq!(parsed.name_and_args, "beta ()");
}

#[test]
fn parse_rejects_spans_without_a_name() {
	assert_eq!(parse("no parens here"), None);
	assert_eq!(parse("(x)"), None);
	assert_eq!(parse("if *(p)"), None);
}

#[test]
fn function_info_display_modes() {
	let sig = "int alpha(int x)".to_string();

	let info = function_info(4, sig.clone(), DisplayMode::Name);
	assert_eq!(info.name, "alpha");
	assert_eq!(info.display_text, "alpha");

	let info = function_info(4, sig.clone(), DisplayMode::NameAndArgs);
	assert_eq!(info.display_text, "alpha (int x)");

	let info = function_info(4, sig.clone(), DisplayMode::Signature);
	assert_eq!(info.display_text, "int alpha (int x)");
	assert_eq!(info.raw_signature, sig);
	assert_eq!(info.line, 4);
}

#[test]
fn function_info_does_not_double_the_inserted_space() {
	let info = function_info(0, "func beta ()".to_string(), DisplayMode::NameAndArgs);
	assert_eq!(info.display_text, "beta ()");
}

#[test]
fn unparseable_span_is_surfaced_verbatim() {
	let info = function_info(7, "case SHL: default".to_string(), DisplayMode::NameAndArgs);
	assert_eq!(info.name, "case SHL: default");
	assert_eq!(info.display_text, "case SHL: default");
}

#[test]
fn alternate_sort_key_uses_declarator_name() {
	assert_eq!(alternate_sort_key("static struct node *Make_node (int)"), "make_node");
	assert_eq!(alternate_sort_key("int zeta(void)"), "zeta");
	assert_eq!(alternate_sort_key("plain"), "plain");
}

#[test]
fn alternate_sort_key_ignores_parentheses_inside_arguments() {
	assert_eq!(alternate_sort_key("int f(int (*cb)(int))"), "f");
	assert_eq!(alternate_sort_key("void Apply (Fn (*g)(int), int n)"), "apply");
}
