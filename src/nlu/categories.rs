//! # Classificador de Categorias — Vocabulário de Despesas em PT-BR
//!
//! O [`CategoryClassifier`] atribui uma categoria de despesa a uma descrição
//! em texto livre, por contagem de palavras-gatilho. É uma **função pura,
//! determinística e sem estado** — nenhum aprendizado, nenhuma chamada
//! externa — e deve permanecer assim para ser testável em isolamento.
//!
//! ## Algoritmo
//!
//! ```text
//! 1. Normaliza a entrada (minúsculas + remoção de diacríticos via NFD)
//! 2. Para cada categoria, conta quantas palavras-gatilho aparecem
//!    como substring da entrada normalizada
//! 3. A categoria com contagem estritamente maior vence;
//!    empate é resolvido pela ordem de declaração da tabela
//! 4. Contagem zero → "Outros"
//! ```
//!
//! ## A Tabela Canônica
//!
//! A tabela única abaixo consolida o vocabulário completo de despesas:
//! onze categorias, de alimentação a assinaturas. As grafias com e sem
//! diacríticos aparecem lado a lado ("café"/"cafe") porque mensagens de
//! chat reais alternam entre as duas.

use super::dates::normalize;

/// Categoria retornada quando nenhuma palavra-gatilho casa.
pub const UNCATEGORIZED: &str = "Outros";

/// Tabela canônica categoria → palavras-gatilho.
///
/// A ordem de declaração é significativa: empates de contagem são
/// resolvidos a favor da categoria declarada primeiro.
const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    (
        "Alimentação",
        &[
            "comi", "almocei", "jantei", "lanchei", "pedi comida", "comer fora", "comi fora",
            "gastei com comida", "gastei em comida", "lanche", "pastel", "coxinha", "pizza",
            "hambúrguer", "hamburguer", "sushi", "esfiha", "marmita", "prato feito",
            "self service", "buffet", "rodízio", "rodizio", "restaurante", "lanchonete",
            "padaria", "cafeteria", "café", "cafe", "bebida", "suco", "refrigerante", "cerveja",
            "ifood", "delivery", "pedido comida", "mercado", "supermercado", "atacadão", "assai",
            "extra", "carrefour",
        ],
    ),
    (
        "Transporte",
        &[
            "abasteci", "abastecer", "fui de uber", "peguei uber", "peguei 99",
            "gastei com transporte", "corrida", "gasolina", "etanol", "diesel", "combustível",
            "combustivel", "posto", "posto de gasolina", "abastecimento", "uber", "99", "taxi",
            "ônibus", "onibus", "metrô", "metro", "trem", "passagem", "estacionamento",
            "pedágio", "pedagio", "oficina", "mecânico", "mecanico", "lavagem", "lava jato",
            "lavacar",
        ],
    ),
    (
        "Moradia",
        &[
            "paguei aluguel", "paguei condomínio", "conta de casa", "gastei com casa", "aluguel",
            "condomínio", "condominio", "luz", "energia", "conta de luz", "conta de energia",
            "água", "agua", "conta de água", "internet", "telefone", "iptu", "gás",
            "gas de cozinha", "botijão", "botijao", "reparo", "conserto", "faxina", "limpeza",
            "diarista",
        ],
    ),
    (
        "Saúde",
        &[
            "fui ao médico", "consulta médica", "gastei com saúde", "médico", "medico",
            "dentista", "psicólogo", "psicologo", "nutricionista", "fisioterapia", "terapia",
            "farmácia", "farmacia", "remédio", "remedio", "hospital", "clínica", "clinica",
            "exame", "checkup", "raio-x", "ultrassom", "ressonância", "plano de saúde",
            "convênio", "convenio", "coparticipação",
        ],
    ),
    (
        "Pets",
        &[
            "gastei com pet", "levei no veterinário", "pet", "cachorro", "gato", "ração",
            "racao", "areia gato", "vacina", "remédio pet", "veterinário", "veterinario",
            "petshop", "banho", "tosa", "hotel pet", "creche pet",
        ],
    ),
    (
        "Dívidas",
        &[
            "paguei fatura", "paguei dívida", "parcelei", "renegociei", "fatura", "cartão",
            "cartao", "cartão de crédito", "cartao de credito", "mínimo", "pagamento mínimo",
            "juros", "boleto", "financiamento", "empréstimo", "emprestimo", "acordo",
            "renegociação", "parcelamento", "atrasado", "em atraso", "consórcio", "consorcio",
        ],
    ),
    (
        "Compras",
        &[
            "comprei", "fiz uma compra", "pedido", "encomenda", "comprei um", "comprei uma",
            "roupa", "camisa", "camiseta", "calça", "calca", "tênis", "tenis", "sapato",
            "celular", "notebook", "computador", "tablet", "televisão", "shopping", "loja",
            "amazon", "shopee", "mercado livre", "magalu", "casas bahia", "americanas", "shein",
        ],
    ),
    (
        "Lazer",
        &[
            "saí", "passei", "viajei", "gastei com lazer", "cinema", "show", "evento",
            "festival", "viagem", "passeio", "bar", "balada", "churrasco", "hotel", "airbnb",
            "resort", "jogo", "game", "videogame", "psn", "xbox",
        ],
    ),
    (
        "Educação",
        &[
            "estudei", "paguei curso", "mensalidade faculdade", "curso", "faculdade", "aula",
            "escola", "mensalidade", "material", "apostila", "livro", "ead", "udemy", "alura",
            "coursera", "hotmart", "mba", "pós", "especialização", "especializacao",
        ],
    ),
    (
        "Investimentos",
        &[
            "investi", "apliquei", "fiz aporte", "aporte mensal", "investimento", "ação",
            "acoes", "fundo", "fii", "cdb", "lci", "lca", "tesouro", "tesouro direto",
            "previdência", "previdencia", "poupança", "poupanca", "cripto", "bitcoin",
            "renda fixa", "renda variável",
        ],
    ),
    (
        "Assinaturas",
        &[
            "assinatura", "plano mensal", "netflix", "spotify", "prime", "youtube",
            "youtube premium", "apple music", "deezer", "chatgpt", "hostinger", "icloud",
            "google one", "dropbox", "office", "office 365", "canva", "notion", "figma",
        ],
    ),
];

/// Classificador determinístico de categorias de despesa.
///
/// Na construção, as palavras-gatilho são pré-normalizadas uma única vez;
/// cada chamada a [`classify()`](Self::classify) normaliza apenas a entrada.
pub struct CategoryClassifier {
    /// (rótulo, gatilhos normalizados), na ordem de declaração da tabela.
    categories: Vec<(&'static str, Vec<String>)>,
}

impl CategoryClassifier {
    /// Cria o classificador com a tabela canônica pré-normalizada.
    pub fn new() -> Self {
        let categories = CATEGORY_TABLE
            .iter()
            .map(|&(label, keywords)| {
                let normalized = keywords.iter().map(|k| normalize(k)).collect();
                (label, normalized)
            })
            .collect();
        Self { categories }
    }

    /// Classifica uma descrição de despesa em uma das categorias canônicas.
    ///
    /// Conta, por categoria, quantas palavras-gatilho aparecem como
    /// substring da entrada normalizada. Vence a contagem **estritamente**
    /// maior; empates ficam com a categoria declarada primeiro; contagem
    /// zero retorna [`UNCATEGORIZED`].
    pub fn classify(&self, text: &str) -> String {
        let normalized = normalize(text);

        let mut best_label = UNCATEGORIZED;
        let mut best_score = 0usize;

        for (label, keywords) in &self.categories {
            let score = keywords.iter().filter(|k| normalized.contains(k.as_str())).count();
            if score > best_score {
                best_score = score;
                best_label = label;
            }
        }

        best_label.to_string()
    }

    /// Mapeia um rótulo vindo de fora (ex.: sugestão do extrator NL) para
    /// o rótulo canônico, comparando sem diacríticos nem capitalização.
    ///
    /// Rótulos desconhecidos retornam `None` — o chamador deve então
    /// reclassificar pela descrição em vez de confiar na sugestão.
    pub fn canonical(&self, label: &str) -> Option<&'static str> {
        let wanted = normalize(label);
        self.categories
            .iter()
            .map(|(l, _)| *l)
            .chain(std::iter::once(UNCATEGORIZED))
            .find(|l| normalize(l) == wanted)
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gasolina_is_transporte() {
        let c = CategoryClassifier::new();
        assert_eq!(c.classify("gasolina 200"), "Transporte");
    }

    #[test]
    fn unknown_text_is_outros() {
        let c = CategoryClassifier::new();
        assert_eq!(c.classify("presente de aniversário"), "Outros");
    }

    #[test]
    fn classification_is_deterministic() {
        let c = CategoryClassifier::new();
        let first = c.classify("almocei no restaurante");
        for _ in 0..10 {
            assert_eq!(c.classify("almocei no restaurante"), first);
        }
        assert_eq!(first, "Alimentação");
    }

    #[test]
    fn diacritics_do_not_matter() {
        let c = CategoryClassifier::new();
        assert_eq!(c.classify("paguei a fatura do cartão"), c.classify("paguei a fatura do cartao"));
    }

    #[test]
    fn tie_breaks_by_declaration_order() {
        let c = CategoryClassifier::new();
        // "mercado" (Alimentação) e "uber" (Transporte) pontuam 1 cada;
        // Alimentação vem primeiro na tabela.
        assert_eq!(c.classify("mercado uber"), "Alimentação");
    }

    #[test]
    fn strictly_higher_count_wins() {
        let c = CategoryClassifier::new();
        // "posto" + "gasolina" (Transporte: 2) contra "mercado" (Alimentação: 1)
        assert_eq!(c.classify("mercado posto gasolina"), "Transporte");
    }

    #[test]
    fn canonical_label_lookup() {
        let c = CategoryClassifier::new();
        assert_eq!(c.canonical("alimentacao"), Some("Alimentação"));
        assert_eq!(c.canonical("TRANSPORTE"), Some("Transporte"));
        assert_eq!(c.canonical("outros"), Some("Outros"));
        assert_eq!(c.canonical("categoria inventada"), None);
    }
}
