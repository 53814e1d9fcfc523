//! Assembly of rendered filters into device configuration text.

use aclgen_policy::PolicyServices;

use crate::compiler::RenderedFilter;

/// Joins rendered filters into one configuration blob.
///
/// Each filter block is: object-group definitions (if any), the `no` and
/// creation lines, the repository stamp, header comments, a `Filter type`
/// remark, then the lines of every term that rendered something, closed by
/// an empty line, `exit` and an empty line. Trailing whitespace is stripped
/// from every line.
pub fn assemble(filters: &[RenderedFilter], services: &dyn PolicyServices) -> String {
    filters
        .iter()
        .flat_map(|filter| filter_block(filter, services))
        .map(|line| line.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn filter_block(filter: &RenderedFilter, services: &dyn PolicyServices) -> Vec<String> {
    let name = filter.filter_name.as_str();
    let filter_type = filter.filter_type;

    let mut block = filter.object_groups.lines();
    block.extend(filter_type.lifecycle_lines(name));

    // Stamps go after the re-create, otherwise IOS has no list to attach them to.
    block.extend(services.stamp_banner(&filter_type.remark_prefix(name), false, false));

    for comment in &filter.header.comment {
        block.extend(comment.split('\n').map(|line| format!(" remark {}", line)));
    }
    block.push(format!(" remark Filter type is {}", filter_type));

    for term in filter.terms.iter().filter(|term| !term.is_empty()) {
        block.extend(term.lines.iter().cloned());
    }

    block.extend([String::new(), "exit".to_string(), String::new()]);
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::RenderedTerm;
    use crate::filter::FilterType;
    use crate::object_group::ObjectGroups;
    use aclgen_policy::{Header, StandardServices, Target};
    use pretty_assertions::assert_eq;

    fn rendered(name: &str, filter_type: FilterType, terms: Vec<RenderedTerm>) -> RenderedFilter {
        RenderedFilter {
            header: Header {
                targets: vec![Target::new("cisco", [name])],
                comment: vec!["edge filter\nsecond line".to_string()],
            },
            filter_name: name.to_string(),
            filter_type,
            terms,
            object_groups: ObjectGroups::new(name),
        }
    }

    fn term(name: &str, lines: &[&str]) -> RenderedTerm {
        RenderedTerm {
            name: name.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_extended_block() {
        let filter = rendered(
            "edge-in",
            FilterType::Extended,
            vec![
                term("allow-web", &["", " remark allow-web", " permit tcp any any eq www"]),
                term("suppressed", &[]),
            ],
        );
        let text = assemble(&[filter], &StandardServices::default());
        let expected = [
            "no ip access-list extended edge-in",
            "ip access-list extended edge-in",
            "remark $Id:$",
            " remark edge filter",
            " remark second line",
            " remark Filter type is extended",
            "",
            " remark allow-web",
            " permit tcp any any eq www",
            "",
            "exit",
            "",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_numeric_standard_block() {
        let filter = rendered(
            "10",
            FilterType::Standard,
            vec![term("t", &["access-list 10 remark t", "access-list 10 permit any"])],
        );
        let text = assemble(&[filter], &StandardServices::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "no access-list 10",
                "access-list 10 remark $Id:$",
                " remark edge filter",
                " remark second line",
                " remark Filter type is standard",
                "access-list 10 remark t",
                "access-list 10 permit any",
                "",
                "exit",
            ]
        );
    }

    #[test]
    fn test_each_filter_self_terminates() {
        let filters = vec![
            rendered("edge-in", FilterType::Extended, vec![]),
            rendered("ipv6-edge-in", FilterType::Inet6, vec![]),
        ];
        let text = assemble(&filters, &StandardServices::default());
        assert_eq!(text.matches("\nexit\n").count(), 2);
        assert!(text.contains("ipv6 access-list ipv6-edge-in"));
        assert!(text.lines().all(|line| line == line.trim_end()));
    }
}
