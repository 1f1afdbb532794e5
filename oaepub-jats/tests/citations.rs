#![allow(clippy::expect_used, clippy::unwrap_used, reason = "Fine in tests")]
use oaepub_jats::{
  citation::{CitationType, ReferenceEntry, format_citation},
  xml::{nodes_to_markup, parse_document},
};

fn journal_ref(issue: Option<&str>) -> ReferenceEntry {
  let issue = issue
    .map(|issue| format!("<issue>{issue}</issue>"))
    .unwrap_or_default();
  let xml = format!(
    r#"<ref id="r1"><label>1</label><element-citation publication-type="journal">
<person-group person-group-type="author">
<name><surname>Smith</surname><given-names>J</given-names></name>
<name><surname>Doe</surname><given-names>A</given-names></name>
</person-group>
<year>2020</year>
<article-title>A Study</article-title>
<source>J. Biol</source>
<volume>12</volume>{issue}
<fpage>100</fpage>
<lpage>110</lpage>
<comment></comment>
</element-citation></ref>"#
  );
  ReferenceEntry::from_ref(&parse_document(&xml).expect("valid reference"))
}

#[test]
fn journal_citation_with_all_fields() {
  let entry = journal_ref(Some("3"));
  assert_eq!(entry.citation_type, CitationType::Journal);

  let formatted = format_citation(&entry, None).unwrap();
  assert_eq!(
    formatted.text(),
    "1. Smith J, Doe A (2020) A Study. J. Biol 12(3): 100-110."
  );
  assert!(formatted.link.is_none());
}

#[test]
fn journal_citation_without_issue() {
  let formatted = format_citation(&journal_ref(None), None).unwrap();
  assert_eq!(
    formatted.text(),
    "1. Smith J, Doe A (2020) A Study. J. Biol 12: 100-110."
  );
}

#[test]
fn journal_citation_links_to_journal_search() {
  let formatted =
    format_citation(&journal_ref(Some("3")), Some("http://www.plosbiology.org/"))
      .unwrap();
  let link = formatted.link.expect("find-article link");
  assert_eq!(
    link.attr("href"),
    Some(
      "http://www.plosbiology.org/article/findArticle.action?author=Smith&title=A%20Study"
    )
  );
  assert_eq!(link.text_content(), "Find This Article Online");
}

#[test]
fn supplement_and_missing_last_page() {
  let entry = ReferenceEntry::from_ref(
    &parse_document(
      r#"<ref id="r2"><label>2</label><citation citation-type="journal"><name><surname>Lee</surname><given-names>K</given-names></name><year>2001</year><article-title>Is it?</article-title><source>Cell</source><volume>4</volume><issue>2</issue><supplement>1</supplement><fpage>9</fpage></citation></ref>"#,
    )
    .unwrap(),
  );
  assert_eq!(
    format_citation(&entry, None).unwrap().text(),
    "2. Lee K (2001) Is it? Cell 4(2 Suppl 1): 9."
  );
}

#[test]
fn conference_comment_links_become_hyperlinks() {
  let entry = ReferenceEntry::from_ref(
    &parse_document(
      r#"<ref id="r3"><label>3</label><element-citation publication-type="confproc"><person-group person-group-type="author"><name><surname>Lee</surname><given-names>C</given-names></name></person-group><article-title>Talk</article-title><conf-name>Big Meeting</conf-name><conf-date>May 2009</conf-date><conf-loc>Paris, France</conf-loc><year>2009</year><comment> Available: <ext-link ext-link-type="uri" xlink:href="http://example.org/talk">http://example.org/talk</ext-link>. Accessed 2010 Jan 5. </comment></element-citation></ref>"#,
    )
    .unwrap(),
  );
  assert_eq!(entry.citation_type, CitationType::ConfProc);

  let formatted = format_citation(&entry, None).unwrap();
  assert_eq!(
    formatted.text(),
    "3. Lee C Talk Big Meeting; May 2009; Paris, France. (2009) Available: \
     http://example.org/talk. Accessed 2010 Jan 5."
  );
  assert!(nodes_to_markup(&formatted.into_nodes()).contains(
    "<a href=\"http://example.org/talk\">http://example.org/talk</a>"
  ));
}
