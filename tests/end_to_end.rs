use dixan_core::bilingual::{build_paradigm_relationship, RelationshipOptions};
use dixan_core::persistence::{load_from_disk, save_to_disk};
use dixan_core::{
    dix, expand_to_forms, expand_to_pairs, extract_stem_paradigm, AnalyserConfig, Candidate, Ranker,
    ReviewSession, SuffixIndex,
};
use std::collections::BTreeSet;

const SPANISH: &str = r#"<dictionary>
  <pardefs>
    <pardef n="gat/o__n">
      <e><p><l>o</l><r>o<s n="n"/><s n="m"/><s n="sg"/></r></p></e>
      <e><p><l>os</l><r>o<s n="n"/><s n="m"/><s n="pl"/></r></p></e>
    </pardef>
    <pardef n="cant/ar__vblex">
      <e><p><l>ar</l><r>ar<s n="vblex"/><s n="inf"/></r></p></e>
      <e><p><l>o</l><r>ar<s n="vblex"/><s n="pri"/><s n="p1"/><s n="sg"/></r></p></e>
      <e><p><l>as</l><r>ar<s n="vblex"/><s n="pri"/><s n="p2"/><s n="sg"/></r></p></e>
    </pardef>
    <pardef n="el__det">
      <e><p><l>el</l><r>el<s n="det"/><s n="def"/></r></p></e>
    </pardef>
  </pardefs>
  <section id="main" type="standard">
    <e lm="gato"><i>gat</i><par n="gat/o__n"/></e>
    <e lm="perro"><i>perr</i><par n="gat/o__n"/></e>
    <e lm="cantar"><i>cant</i><par n="cant/ar__vblex"/></e>
    <e lm="el"><i></i><par n="el__det"/></e>
  </section>
</dictionary>"#;

const ENGLISH: &str = r#"<dictionary>
  <pardefs>
    <pardef n="cat__n">
      <e><p><l></l><r><s n="n"/><s n="sg"/></r></p></e>
      <e><p><l>s</l><r><s n="n"/><s n="pl"/></r></p></e>
    </pardef>
    <pardef n="sing__vblex">
      <e><p><l></l><r><s n="vblex"/><s n="inf"/></r></p></e>
    </pardef>
  </pardefs>
  <section id="main" type="standard">
    <e lm="cat"><i>cat</i><par n="cat__n"/></e>
    <e lm="dog"><i>dog</i><par n="cat__n"/></e>
    <e lm="sing"><i>sing</i><par n="sing__vblex"/></e>
  </section>
</dictionary>"#;

const BILINGUAL: &str = r#"<dictionary>
  <section id="main" type="standard">
    <e><p><l>gato<s n="n"/><s n="GD"/></l><r>cat<s n="n"/></r></p></e>
    <e><p><l>perro<s n="n"/></l><r>dog<s n="n"/></r></p></e>
    <e><p><l>cantar<s n="vblex"/></l><r>sing<s n="vblex"/></r></p></e>
    <e><p><l>volar<s n="vblex"/></l><r>fly<s n="vblex"/></r></p></e>
  </section>
</dictionary>"#;

#[test]
fn parsed_entries_expand_in_both_modes() {
    let dic = dix::parse_str(SPANISH).unwrap();
    let gato = dic.entries().next().unwrap();

    let forms = expand_to_forms(gato, false, &dic);
    assert_eq!(forms, BTreeSet::from(["gato".to_string(), "gatos".to_string()]));

    let lexical = expand_to_forms(gato, true, &dic);
    assert!(lexical.contains("gato<n><m><pl>"));

    let pairs = expand_to_pairs(gato, &dic, None);
    assert!(pairs.contains(&("gatos".to_string(), "<n><m><pl>".to_string())));
    assert_eq!(pairs.len(), 2);
}

#[test]
fn entries_yield_stem_and_paradigm() {
    let dic = dix::parse_str(SPANISH).unwrap();
    let extracted: Vec<_> = dic.entries().filter_map(extract_stem_paradigm).collect();
    // the determiner has an empty stem
    assert_eq!(extracted.len(), 3);
    assert_eq!(extracted[2], Candidate::new("cant", "cant/ar__vblex"));
}

#[test]
fn paradigm_relationship_from_bilingual_links() {
    let es = dix::parse_str(SPANISH).unwrap();
    let en = dix::parse_str(ENGLISH).unwrap();
    let bil = dix::parse_str(BILINGUAL).unwrap();
    let config = AnalyserConfig::default();

    let forward = build_paradigm_relationship(&bil, &es, &en, RelationshipOptions::default(), &config);
    assert_eq!(forward.score("gat/o__n", "cat__n"), 1.0);
    assert_eq!(forward.score("cant/ar__vblex", "sing__vblex"), 1.0);
    assert_eq!(forward.len(), 2);

    let options = RelationshipOptions { reverse: true, ..Default::default() };
    let backward = build_paradigm_relationship(&bil, &es, &en, options, &config);
    assert_eq!(backward.best_match("cat__n"), Some(("gat/o__n", 1.0)));
}

#[test]
fn ranked_review_reaches_a_solution() {
    let es = dix::parse_str(SPANISH).unwrap();
    let en = dix::parse_str(ENGLISH).unwrap();
    let bil = dix::parse_str(BILINGUAL).unwrap();
    let config = AnalyserConfig::default();
    let options = RelationshipOptions { reverse: true, ..Default::default() };
    let relationship = build_paradigm_relationship(&bil, &es, &en, options, &config);

    let index = SuffixIndex::build(&es, Some(&config.closed_categories()));
    let candidates = index.candidates_for("canto");
    assert!(candidates.contains(&Candidate::new("cant", "gat/o__n")));
    assert!(candidates.contains(&Candidate::new("cant", "cant/ar__vblex")));

    let ranked = Ranker::new(&es, config.ranking.clone())
        .with_relationship(&relationship)
        .rank(candidates, &["sing__vblex".to_string()]);
    assert_eq!(ranked[0].paradigm(), "cant/ar__vblex");

    let mut session = ReviewSession::new("canto", ranked, &es);
    while let Some(form) = session.next_form_to_ask().map(str::to_string) {
        if form == "cantar" || form == "cantas" || form == "canto" {
            session.accept_form(&form);
        } else {
            session.reject_form(&form);
        }
    }
    let solution = session.solution().unwrap();
    assert_eq!(solution.len(), 1);
    assert_eq!(solution[0].paradigm(), "cant/ar__vblex");
}

#[test]
fn review_session_snapshot_round_trips() {
    let es = dix::parse_str(SPANISH).unwrap();
    let candidates = SuffixIndex::build(&es, None).candidates_for("canto");
    let ranked = Ranker::new(&es, Default::default()).rank(candidates, &[]);
    let mut session = ReviewSession::new("canto", ranked, &es);
    assert_eq!(session.next_form_to_ask(), Some("cantar"));
    session.reject_form("cantar");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.bin");
    save_to_disk(&session, &path).unwrap();
    let restored: ReviewSession = load_from_disk(&path).unwrap();
    assert_eq!(restored.decisions(), session.decisions());
    assert_eq!(restored.pending().len(), 1);
    assert_eq!(restored.next_form_to_ask(), session.next_form_to_ask());

    let json = serde_json::to_string(&restored).unwrap();
    assert!(json.contains("cantar"));
}

#[test]
fn irregular_stems_resolve_through_their_lemma() {
    let es = dix::parse_str(
        r#"<dictionary>
  <pardefs>
    <pardef n="dec/ir__vblex">
      <e><p><l>ir</l><r>ir<s n="vblex"/><s n="inf"/></r></p></e>
      <e><p><l>e</l><r>ir<s n="vblex"/><s n="ifi"/><s n="p1"/><s n="sg"/></r></p></e>
    </pardef>
  </pardefs>
  <section id="main" type="standard">
    <e lm="decir"><p><l>dij</l><r>dec</r></p><par n="dec/ir__vblex"/></e>
  </section>
</dictionary>"#,
    )
    .unwrap();
    let en = dix::parse_str(
        r#"<dictionary>
  <pardefs>
    <pardef n="say__vblex"><e><p><l></l><r><s n="vblex"/><s n="inf"/></r></p></e></pardef>
  </pardefs>
  <section id="main" type="standard">
    <e lm="say"><i>say</i><par n="say__vblex"/></e>
  </section>
</dictionary>"#,
    )
    .unwrap();
    let bil = dix::parse_str(
        r#"<dictionary><section id="main" type="standard">
    <e><p><l>decir<s n="vblex"/></l><r>say<s n="vblex"/></r></p></e>
  </section></dictionary>"#,
    )
    .unwrap();

    let relationship =
        build_paradigm_relationship(&bil, &es, &en, RelationshipOptions::default(), &AnalyserConfig::default());
    assert_eq!(relationship.score("dec/ir__vblex", "say__vblex"), 1.0);
}
